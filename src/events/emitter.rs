use super::{EventName, EventSource, Listener, ListenerId, Payload, Socket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

struct Entry {
    id: ListenerId,
    event: EventName,
    once: bool,
    listener: Arc<Mutex<Listener>>,
}

/// In-memory [`EventSource`].
///
/// Listeners run synchronously inside [`Emitter::emit`], in registration
/// order. The listener table is not locked while they run, so a listener may
/// subscribe or unsubscribe on the same emitter. Listeners registered during
/// an emission are not called for that emission.
#[derive(Default)]
pub struct Emitter {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls every listener registered for `event`. Returns whether there
    /// was at least one.
    pub fn emit(&self, event: EventName, payload: &Payload<'_>) -> bool {
        let listeners: Vec<Arc<Mutex<Listener>>> = {
            let mut entries = self.entries();
            let matching = entries
                .iter()
                .filter(|entry| entry.event == event)
                .map(|entry| entry.listener.clone())
                .collect();
            entries.retain(|entry| !(entry.once && entry.event == event));
            matching
        };
        trace!("emit {} to {} listener(s)", event, listeners.len());

        for listener in &listeners {
            match listener.try_lock() {
                Ok(mut callback) => (&mut **callback)(payload),
                Err(TryLockError::Poisoned(poisoned)) => {
                    let mut callback = poisoned.into_inner();
                    (&mut **callback)(payload)
                }
                // The listener is further up this call stack.
                Err(TryLockError::WouldBlock) => {
                    trace!("listener for {} is already running, skipped", event)
                }
            }
        }
        !listeners.is_empty()
    }

    pub fn listener_count(&self, event: EventName) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    fn add(&self, event: EventName, listener: Listener, once: bool) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push(Entry {
            id,
            event,
            once,
            listener: Arc::new(Mutex::new(listener)),
        });
        id
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSource for Emitter {
    fn on(&self, event: EventName, listener: Listener) -> ListenerId {
        self.add(event, listener, false)
    }

    fn once(&self, event: EventName, listener: Listener) -> ListenerId {
        self.add(event, listener, true)
    }

    fn off(&self, event: EventName, id: ListenerId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| !(entry.id == id && entry.event == event));
        entries.len() != before
    }
}

/// [`Emitter`] for a connection, tracking whether it has connected.
#[derive(Default)]
pub struct SocketEmitter {
    events: Emitter,
    connected: AtomicBool,
}

impl SocketEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A socket that finished connecting before anyone observed it, as a
    /// pooled keep-alive connection is.
    pub fn already_connected() -> Self {
        Self {
            events: Emitter::new(),
            connected: AtomicBool::new(true),
        }
    }

    /// Marks the socket connected and emits [`EventName::Connect`]. Only the
    /// first call emits.
    pub fn set_connected(&self) {
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.events.emit(EventName::Connect, &Payload::None);
        }
    }

    pub fn emit(&self, event: EventName, payload: &Payload<'_>) -> bool {
        self.events.emit(event, payload)
    }

    pub fn listener_count(&self, event: EventName) -> usize {
        self.events.listener_count(event)
    }
}

impl EventSource for SocketEmitter {
    fn on(&self, event: EventName, listener: Listener) -> ListenerId {
        self.events.on(event, listener)
    }

    fn once(&self, event: EventName, listener: Listener) -> ListenerId {
        self.events.once(event, listener)
    }

    fn off(&self, event: EventName, id: ListenerId) -> bool {
        self.events.off(event, id)
    }
}

impl Socket for SocketEmitter {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
