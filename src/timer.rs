//! The timing observer.
//!
//! [`observe`] subscribes to a request's lifecycle events and returns a
//! [`TimingHandle`] before any of them fire. Listeners fill in the record as
//! the transport makes progress:
//!
//! ```text
//! request  ── socket ─────────────────── finish ── response ─┐
//! socket        ├─ lookup ─ connect ─ secureConnect          │
//! response                                                    └─ end
//! ```
//!
//! Transports do not always emit the middle of that picture. A pooled socket
//! is already connected and never looks anything up, an IP-literal host skips
//! `lookup`, and `finish` can race `connect`. Those cases collapse the
//! affected phases to zero instead of leaving them undefined.

use crate::clock::{Clock, MonotonicClock};
use crate::events::{defer_to_connect, EventName, EventSource, ListenerId, Payload, Socket};
use crate::timing::Timings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug)]
struct State {
    timings: Timings,
    upload_finished: bool,
    socket: Option<Weak<dyn Socket>>,
    lookup_listener: Option<ListenerId>,
    secure_connect_listener: Option<ListenerId>,
}

impl State {
    /// Records `upload` once `connect` is known.
    fn record_upload(&mut self, now: f64) {
        let Some(connect) = self.timings.connect else {
            return;
        };
        if self.timings.upload.is_none() {
            self.timings.upload = Some(now);
            self.timings.phases.request = Some(now - connect);
            trace!("upload at {:.3} ms", now);
        }
    }

    /// `total` belongs to whichever terminal event lands first.
    fn record_total(&mut self, at: f64) {
        if self.timings.phases.total.is_none() {
            self.timings.phases.total = Some(at - self.timings.start);
        }
    }
}

/// Live view of the timing record of one request.
///
/// Clones share the record. Fields appear as the observed request makes
/// progress; read them with [`TimingHandle::snapshot`].
#[derive(Debug, Clone)]
pub struct TimingHandle {
    state: Arc<Mutex<State>>,
}

impl TimingHandle {
    /// Copy of the record as it is right now.
    pub fn snapshot(&self) -> Timings {
        self.lock().timings.clone()
    }

    /// Whether `end` or `error` has been recorded.
    pub fn is_settled(&self) -> bool {
        self.lock().timings.is_settled()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Attaches a timing observer to `request` using the process monotonic clock.
pub fn observe(request: &dyn EventSource) -> TimingHandle {
    Timer::new().observe(request)
}

/// Builds timing observers with a chosen clock.
#[derive(Clone)]
pub struct Timer {
    clock: Arc<dyn Clock>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Subscribes to `request` and returns the record, with only `start` set.
    pub fn observe(&self, request: &dyn EventSource) -> TimingHandle {
        let start = self.clock.now_ms();
        let handle = TimingHandle {
            state: Arc::new(Mutex::new(State {
                timings: Timings::new(start),
                upload_finished: false,
                socket: None,
                lookup_listener: None,
                secure_connect_listener: None,
            })),
        };
        let recorder = Recorder {
            clock: self.clock.clone(),
            handle: handle.clone(),
        };

        recorder.capture_first_error(request);

        let on_socket = recorder.clone();
        request.once(
            EventName::Socket,
            Box::new(move |payload| match payload {
                Payload::Socket(socket) => on_socket.socket(socket),
                other => debug!("socket event without a socket: {:?}", other),
            }),
        );

        let on_finish = recorder.clone();
        request.once(EventName::Finish, Box::new(move |_| on_finish.finish()));

        let on_response = recorder;
        request.once(
            EventName::Response,
            Box::new(move |payload| {
                on_response.response();
                match payload {
                    Payload::Response(response) => on_response.watch_response(&***response),
                    other => debug!("response event without a response: {:?}", other),
                }
            }),
        );

        handle
    }
}

/// What the listeners share. The state lock is never held while calling
/// into an event source.
#[derive(Clone)]
struct Recorder {
    clock: Arc<dyn Clock>,
    handle: TimingHandle,
}

impl Recorder {
    /// One-shot `error` tap. Request and response each get one; the first
    /// error across both is the one recorded.
    fn capture_first_error(&self, origin: &dyn EventSource) {
        let recorder = self.clone();
        origin.once(
            EventName::Error,
            Box::new(move |payload| {
                if let Payload::Error(err) = payload {
                    debug!("request failed: {:#}", err);
                }
                recorder.error();
            }),
        );
    }

    fn socket(&self, socket: &Arc<dyn Socket>) {
        let now = self.clock.now_ms();
        {
            let mut state = self.handle.lock();
            if state.timings.socket.is_some() {
                return;
            }
            state.timings.socket = Some(now);
            state.timings.phases.wait = Some(now - state.timings.start);
        }
        trace!("socket assigned at {:.3} ms", now);

        // A pooled socket counts as connected the moment it is assigned, and
        // never handshakes again.
        let pooled = socket.is_connected();

        let on_lookup = self.clone();
        let lookup_listener =
            socket.once(EventName::Lookup, Box::new(move |_| on_lookup.lookup()));
        let secure_connect_listener = (!pooled).then(|| {
            let on_secure_connect = self.clone();
            socket.once(
                EventName::SecureConnect,
                Box::new(move |_| on_secure_connect.secure_connect()),
            )
        });
        let settled = {
            let mut state = self.handle.lock();
            state.socket = Some(Arc::downgrade(socket));
            state.lookup_listener = Some(lookup_listener);
            state.secure_connect_listener = secure_connect_listener;
            state.timings.is_settled()
        };
        if settled {
            self.release_socket();
        }

        let connected_at = pooled.then_some(now);
        let on_connect = self.clone();
        let connected = Arc::downgrade(socket);
        defer_to_connect(&**socket, move || {
            if let Some(socket) = connected.upgrade() {
                on_connect.connect(&*socket, connected_at);
            }
        });
    }

    fn lookup(&self) {
        let now = self.clock.now_ms();
        let mut state = self.handle.lock();
        state.lookup_listener = None;
        let Some(socket) = state.timings.socket else {
            return;
        };
        if state.timings.dns_lookup.is_none() {
            state.timings.dns_lookup = Some(now);
            state.timings.phases.dns = Some(now - socket);
            trace!("dns lookup done at {:.3} ms", now);
        }
    }

    fn secure_connect(&self) {
        let now = self.clock.now_ms();
        let mut state = self.handle.lock();
        state.secure_connect_listener = None;
        if state.timings.tls_handshake.is_none() {
            state.timings.tls_handshake = Some(now);
            trace!("tls handshake done at {:.3} ms", now);
        }
    }

    fn connect(&self, socket: &dyn Socket, at: Option<f64>) {
        let now = at.unwrap_or_else(|| self.clock.now_ms());
        let stale_lookup = {
            let mut state = self.handle.lock();
            if state.timings.connect.is_some() {
                return;
            }
            state.timings.connect = Some(now);
            trace!("connected at {:.3} ms", now);

            let mut stale_lookup = None;
            let dns_lookup = match state.timings.dns_lookup {
                Some(at) => at,
                None => {
                    debug!("no dns lookup observed before connect, dns phase is zero");
                    stale_lookup = state.lookup_listener.take();
                    state.timings.dns_lookup = Some(now);
                    state.timings.phases.dns = Some(0.0);
                    now
                }
            };
            state.timings.phases.tcp = Some(now - dns_lookup);

            if state.upload_finished {
                state.record_upload(now);
            }
            stale_lookup
        };

        if let Some(id) = stale_lookup {
            socket.off(EventName::Lookup, id);
        }
    }

    fn finish(&self) {
        let now = self.clock.now_ms();
        let mut state = self.handle.lock();
        state.upload_finished = true;
        if state.timings.connect.is_some() {
            state.record_upload(now);
        } else {
            trace!("request body finished before connect, upload pending");
        }
    }

    fn response(&self) {
        let now = self.clock.now_ms();
        let mut state = self.handle.lock();
        if state.timings.response.is_some() {
            return;
        }
        state.timings.response = Some(now);
        state.timings.phases.first_byte = state.timings.upload.map(|upload| now - upload);
        trace!("response headers at {:.3} ms", now);
    }

    fn watch_response(&self, response: &dyn EventSource) {
        self.capture_first_error(response);

        let on_end = self.clone();
        response.once(EventName::End, Box::new(move |_| on_end.end()));
    }

    fn end(&self) {
        let now = self.clock.now_ms();
        {
            let mut state = self.handle.lock();
            if state.timings.end.is_some() {
                return;
            }
            state.timings.end = Some(now);
            state.timings.phases.download =
                state.timings.response.map(|response| now - response);
            state.record_total(now);
        }
        trace!("response body done at {:.3} ms", now);
        self.release_socket();
    }

    fn error(&self) {
        let now = self.clock.now_ms();
        {
            let mut state = self.handle.lock();
            if state.timings.error.is_some() {
                return;
            }
            state.timings.error = Some(now);
            state.record_total(now);
        }
        self.release_socket();
    }

    /// Unsubscribes whatever is still listening on the socket. The socket may
    /// be pooled and outlive this request.
    fn release_socket(&self) {
        let (socket, listeners) = {
            let mut state = self.handle.lock();
            let Some(socket) = state.socket.take().and_then(|socket| socket.upgrade()) else {
                return;
            };
            let listeners = [
                (EventName::Lookup, state.lookup_listener.take()),
                (EventName::SecureConnect, state.secure_connect_listener.take()),
            ];
            (socket, listeners)
        };
        for (event, id) in listeners {
            if let Some(id) = id {
                socket.off(event, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::{Emitter, SocketEmitter};
    use yare::parameterized;

    struct Harness {
        clock: Arc<ManualClock>,
        request: Emitter,
        timings: TimingHandle,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new(100.0));
            let request = Emitter::new();
            let timings = Timer::with_clock(clock.clone()).observe(&request);
            Self {
                clock,
                request,
                timings,
            }
        }

        fn at(&self, ms: f64) -> &Self {
            self.clock.set(ms);
            self
        }

        fn assign(&self, socket: &Arc<SocketEmitter>) {
            let handle: Arc<dyn Socket> = socket.clone();
            self.request
                .emit(EventName::Socket, &Payload::Socket(&handle));
        }

        fn respond(&self) -> Arc<Emitter> {
            let response = Arc::new(Emitter::new());
            let handle: Arc<dyn EventSource> = response.clone();
            self.request
                .emit(EventName::Response, &Payload::Response(&handle));
            response
        }

        fn fail(&self, origin: &Emitter, message: &str) -> bool {
            let err = anyhow::anyhow!("{}", message.to_string());
            origin.emit(EventName::Error, &Payload::Error(&err))
        }

        fn timings(&self) -> Timings {
            self.timings.snapshot()
        }
    }

    fn assert_ordered(timings: &Timings) {
        let ordered = timings.ordered();
        for pair in ordered.windows(2) {
            assert!(
                pair[0].1 <= pair[1].1,
                "{} ({}) is after {} ({})",
                pair[0].0,
                pair[0].1,
                pair[1].0,
                pair[1].1
            );
        }
    }

    /// Fresh TLS connection, every event in lifecycle order.
    fn full_lifecycle(harness: &Harness) {
        let socket = Arc::new(SocketEmitter::new());
        harness.at(101.0).assign(&socket);
        harness.at(103.0);
        socket.emit(EventName::Lookup, &Payload::None);
        harness.at(110.0);
        socket.set_connected();
        harness.at(130.0);
        socket.emit(EventName::SecureConnect, &Payload::None);
        harness.at(131.0).request.emit(EventName::Finish, &Payload::None);
        let response = harness.at(150.0).respond();
        harness.at(170.0);
        response.emit(EventName::End, &Payload::None);
    }

    #[test]
    fn test_only_start_is_set_on_return() {
        let harness = Harness::new();
        let timings = harness.timings();
        assert_eq!(timings, Timings::new(100.0));
        assert!(!harness.timings.is_settled());
    }

    #[test]
    fn test_full_lifecycle_fills_every_field() {
        let harness = Harness::new();
        full_lifecycle(&harness);

        let timings = harness.timings();
        assert_eq!(timings.socket, Some(101.0));
        assert_eq!(timings.dns_lookup, Some(103.0));
        assert_eq!(timings.connect, Some(110.0));
        assert_eq!(timings.tls_handshake, Some(130.0));
        assert_eq!(timings.upload, Some(131.0));
        assert_eq!(timings.response, Some(150.0));
        assert_eq!(timings.end, Some(170.0));
        assert_eq!(timings.error, None);

        assert_eq!(timings.phases.wait, Some(1.0));
        assert_eq!(timings.phases.dns, Some(2.0));
        assert_eq!(timings.phases.tcp, Some(7.0));
        assert_eq!(timings.phases.request, Some(21.0));
        assert_eq!(timings.phases.first_byte, Some(19.0));
        assert_eq!(timings.phases.download, Some(20.0));
        assert_eq!(timings.phases.total, Some(70.0));
        assert_ordered(&timings);
        assert!(harness.timings.is_settled());
    }

    #[test]
    fn test_total_matches_end_minus_start() {
        let harness = Harness::new();
        full_lifecycle(&harness);

        let timings = harness.timings();
        let end = timings.end.unwrap();
        assert_eq!(timings.phases.total, Some(end - timings.start));
    }

    #[test]
    fn test_pooled_socket_collapses_dns_and_tcp() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::already_connected());
        harness.at(100.5).assign(&socket);

        let timings = harness.timings();
        assert_eq!(timings.socket, Some(100.5));
        assert_eq!(timings.connect, Some(100.5));
        assert_eq!(timings.dns_lookup, timings.connect);
        assert_eq!(timings.tls_handshake, None);
        assert_eq!(timings.phases.dns, Some(0.0));
        assert_eq!(timings.phases.tcp, Some(0.0));
        assert_eq!(socket.listener_count(EventName::Lookup), 0);
    }

    #[test]
    fn test_missing_lookup_is_inferred_at_connect() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::new());
        harness.at(102.0).assign(&socket);
        assert_eq!(socket.listener_count(EventName::Lookup), 1);

        harness.at(109.0);
        socket.set_connected();

        let timings = harness.timings();
        assert_eq!(timings.dns_lookup, Some(109.0));
        assert_eq!(timings.connect, Some(109.0));
        assert_eq!(timings.phases.dns, Some(0.0));
        assert_eq!(timings.phases.tcp, Some(0.0));
        assert_eq!(socket.listener_count(EventName::Lookup), 0);

        // A late lookup no longer reaches the record.
        harness.at(115.0);
        assert!(!socket.emit(EventName::Lookup, &Payload::None));
        assert_eq!(harness.timings().dns_lookup, Some(109.0));
    }

    #[test]
    fn test_pooled_socket_keeps_no_listeners_across_requests() {
        let socket = Arc::new(SocketEmitter::already_connected());
        for i in 0..50 {
            let harness = Harness::new();
            harness.at(101.0).assign(&socket);
            harness.request.emit(EventName::Finish, &Payload::None);
            let response = harness.at(110.0).respond();
            if i % 2 == 0 {
                response.emit(EventName::End, &Payload::None);
            } else {
                harness.fail(&response, "reset");
            }
        }

        assert_eq!(socket.listener_count(EventName::SecureConnect), 0);
        assert_eq!(socket.listener_count(EventName::Lookup), 0);
        assert_eq!(socket.listener_count(EventName::Connect), 0);
    }

    #[test]
    fn test_plaintext_socket_is_released_when_request_ends() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::new());
        harness.at(101.0).assign(&socket);
        assert_eq!(socket.listener_count(EventName::SecureConnect), 1);

        harness.at(104.0);
        socket.set_connected();
        harness.request.emit(EventName::Finish, &Payload::None);
        let response = harness.at(110.0).respond();
        harness.at(115.0);
        response.emit(EventName::End, &Payload::None);

        assert_eq!(socket.listener_count(EventName::SecureConnect), 0);
        // A handshake reported after the fact is not recorded.
        assert!(!socket.emit(EventName::SecureConnect, &Payload::None));
        assert_eq!(harness.timings().tls_handshake, None);
    }

    #[test]
    fn test_socket_after_error_is_released() {
        let harness = Harness::new();
        harness.at(102.0);
        harness.fail(&harness.request, "aborted");

        let socket = Arc::new(SocketEmitter::new());
        harness.at(103.0).assign(&socket);
        assert_eq!(socket.listener_count(EventName::Lookup), 0);
        assert_eq!(socket.listener_count(EventName::SecureConnect), 0);
    }

    #[test]
    fn test_finish_before_connect_waits_for_connect() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::new());
        harness.at(101.0).assign(&socket);
        harness.at(102.0);
        socket.emit(EventName::Lookup, &Payload::None);

        harness.at(104.0).request.emit(EventName::Finish, &Payload::None);
        assert_eq!(harness.timings().upload, None);
        assert_eq!(harness.timings().phases.request, None);

        harness.at(108.0);
        socket.set_connected();

        let timings = harness.timings();
        assert_eq!(timings.connect, Some(108.0));
        assert_eq!(timings.upload, Some(108.0));
        assert_eq!(timings.phases.request, Some(0.0));
        assert_ordered(&timings);
    }

    #[test]
    fn test_finish_before_socket_waits_for_pooled_connect() {
        let harness = Harness::new();
        harness.at(101.0).request.emit(EventName::Finish, &Payload::None);

        let socket = Arc::new(SocketEmitter::already_connected());
        harness.at(103.0).assign(&socket);

        let timings = harness.timings();
        assert_eq!(timings.upload, Some(103.0));
        assert_eq!(timings.phases.request, Some(0.0));
    }

    #[test]
    fn test_error_before_socket_only_sets_start_and_error() {
        let harness = Harness::new();
        harness.at(112.0);
        assert!(harness.fail(&harness.request, "getaddrinfo ENOTFOUND"));

        let timings = harness.timings();
        let mut expected = Timings::new(100.0);
        expected.error = Some(112.0);
        expected.phases.total = Some(12.0);
        assert_eq!(timings, expected);
        assert!(harness.timings.is_settled());
    }

    #[test]
    fn test_response_error_keeps_earlier_fields() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::already_connected());
        harness.at(101.0).assign(&socket);
        harness.at(102.0).request.emit(EventName::Finish, &Payload::None);
        let response = harness.at(120.0).respond();

        harness.at(135.0);
        assert!(harness.fail(&response, "socket hang up"));

        let timings = harness.timings();
        assert_eq!(timings.response, Some(120.0));
        assert_eq!(timings.phases.first_byte, Some(18.0));
        assert_eq!(timings.error, Some(135.0));
        assert_eq!(timings.phases.total, Some(35.0));
        assert_eq!(timings.end, None);
        assert_eq!(timings.phases.download, None);
    }

    #[test]
    fn test_second_error_does_not_change_record() {
        let harness = Harness::new();
        harness.at(105.0);
        harness.fail(&harness.request, "first");
        harness.at(150.0);
        assert!(!harness.fail(&harness.request, "second"));

        let timings = harness.timings();
        assert_eq!(timings.error, Some(105.0));
        assert_eq!(timings.phases.total, Some(5.0));
    }

    #[test]
    fn test_response_error_after_request_error_is_ignored() {
        let harness = Harness::new();
        let response = harness.at(110.0).respond();
        harness.at(111.0);
        harness.fail(&harness.request, "aborted");
        harness.at(140.0);
        harness.fail(&response, "aborted");

        let timings = harness.timings();
        assert_eq!(timings.error, Some(111.0));
        assert_eq!(timings.phases.total, Some(11.0));
    }

    #[test]
    fn test_late_error_after_end_keeps_total() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::already_connected());
        harness.at(101.0).assign(&socket);
        let response = harness.at(110.0).respond();
        harness.at(120.0);
        response.emit(EventName::End, &Payload::None);
        harness.at(500.0);
        harness.fail(&response, "late");

        let timings = harness.timings();
        assert_eq!(timings.end, Some(120.0));
        assert_eq!(timings.error, Some(500.0));
        assert_eq!(timings.phases.total, Some(20.0));
    }

    #[test]
    fn test_response_without_upload_has_no_first_byte() {
        let harness = Harness::new();
        harness.at(130.0).respond();

        let timings = harness.timings();
        assert_eq!(timings.response, Some(130.0));
        assert_eq!(timings.phases.first_byte, None);
    }

    #[test]
    fn test_repeated_events_do_not_overwrite() {
        let harness = Harness::new();
        full_lifecycle(&harness);
        let before = harness.timings();

        let socket = Arc::new(SocketEmitter::new());
        harness.at(900.0).assign(&socket);
        socket.set_connected();
        harness.request.emit(EventName::Finish, &Payload::None);
        harness.respond().emit(EventName::End, &Payload::None);

        assert_eq!(harness.timings(), before);
    }

    #[test]
    fn test_only_first_secure_connect_is_recorded() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::new());
        harness.at(101.0).assign(&socket);
        socket.set_connected();
        harness.at(120.0);
        socket.emit(EventName::SecureConnect, &Payload::None);
        harness.at(140.0);
        socket.emit(EventName::SecureConnect, &Payload::None);

        assert_eq!(harness.timings().tls_handshake, Some(120.0));
    }

    #[test]
    fn test_plaintext_socket_has_no_tls_handshake() {
        let harness = Harness::new();
        let socket = Arc::new(SocketEmitter::new());
        harness.at(101.0).assign(&socket);
        harness.at(102.0);
        socket.emit(EventName::Lookup, &Payload::None);
        harness.at(104.0);
        socket.set_connected();

        let timings = harness.timings();
        assert_eq!(timings.tls_handshake, None);
        assert_eq!(timings.phases.tcp, Some(2.0));
    }

    #[test]
    fn test_handles_are_independent_per_request() {
        let clock = Arc::new(ManualClock::new(0.0));
        let timer = Timer::with_clock(clock.clone());
        let first = Emitter::new();
        let second = Emitter::new();
        let first_timings = timer.observe(&first);
        clock.set(50.0);
        let second_timings = timer.observe(&second);

        clock.set(60.0);
        let err = anyhow::anyhow!("refused");
        first.emit(EventName::Error, &Payload::Error(&err));

        assert_eq!(first_timings.snapshot().phases.total, Some(60.0));
        assert_eq!(second_timings.snapshot().error, None);
        assert_eq!(second_timings.snapshot().start, 50.0);
    }

    #[parameterized(
        lookup_then_connect = { true, false },
        pooled = { false, true },
        ip_literal = { false, false },
    )]
    fn test_phases_are_never_negative(emit_lookup: bool, pooled: bool) {
        let harness = Harness::new();
        let socket = Arc::new(if pooled {
            SocketEmitter::already_connected()
        } else {
            SocketEmitter::new()
        });
        harness.at(101.0).assign(&socket);
        if emit_lookup {
            harness.at(104.0);
            socket.emit(EventName::Lookup, &Payload::None);
        }
        harness.at(110.0);
        socket.set_connected();
        harness.at(111.0).request.emit(EventName::Finish, &Payload::None);
        let response = harness.at(140.0).respond();
        harness.at(160.0);
        response.emit(EventName::End, &Payload::None);

        let timings = harness.timings();
        let phases = &timings.phases;
        for phase in [
            phases.wait,
            phases.dns,
            phases.tcp,
            phases.request,
            phases.first_byte,
            phases.download,
            phases.total,
        ] {
            let value = phase.expect("phase should be set");
            assert!(value >= 0.0);
        }
        assert_ordered(&timings);
    }

    #[test]
    fn test_monotonic_observe_has_plausible_start() {
        let request = Emitter::new();
        let timings = observe(&request);
        let err = anyhow::anyhow!("boom");
        request.emit(EventName::Error, &Payload::Error(&err));

        let snapshot = timings.snapshot();
        let error = snapshot.error.unwrap();
        assert!(error >= snapshot.start);
        assert_eq!(snapshot.phases.total, Some(error - snapshot.start));
    }
}
