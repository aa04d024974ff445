//! Named-event subscription contract between a transport and its observers.
//!
//! A transport exposes its request, socket and response lifecycles as
//! [`EventSource`]s. Observers subscribe by [`EventName`] and receive a
//! [`Payload`] describing the occurrence. [`Emitter`] is the in-memory
//! implementation the bundled transport uses.

pub mod connect;
pub mod emitter;

use std::fmt;
use std::sync::Arc;

pub use connect::defer_to_connect;
pub use emitter::{Emitter, SocketEmitter};

/// Identifies a registered listener so it can be removed with
/// [`EventSource::off`].
pub type ListenerId = u64;

/// Callback invoked for every matching event.
pub type Listener = Box<dyn FnMut(&Payload<'_>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Request was assigned a socket.
    Socket,
    /// Socket finished resolving the remote host.
    Lookup,
    /// Socket finished connecting.
    Connect,
    /// Socket finished the TLS handshake.
    SecureConnect,
    /// Request body was fully handed to the transport.
    Finish,
    /// Response headers arrived.
    Response,
    /// Response body was fully received.
    End,
    Error,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Socket => "socket",
            EventName::Lookup => "lookup",
            EventName::Connect => "connect",
            EventName::SecureConnect => "secureConnect",
            EventName::Finish => "finish",
            EventName::Response => "response",
            EventName::End => "end",
            EventName::Error => "error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by an event.
pub enum Payload<'a> {
    None,
    Socket(&'a Arc<dyn Socket>),
    Response(&'a Arc<dyn EventSource>),
    Error(&'a anyhow::Error),
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Socket(socket) => f
                .debug_struct("Socket")
                .field("connected", &socket.is_connected())
                .finish(),
            Payload::Response(_) => f.write_str("Response"),
            Payload::Error(err) => f.debug_tuple("Error").field(err).finish(),
        }
    }
}

/// Subscribe/unsubscribe capability implemented by event producers.
pub trait EventSource: Send + Sync {
    /// Registers `listener` for every occurrence of `event`.
    fn on(&self, event: EventName, listener: Listener) -> ListenerId;

    /// Registers `listener` for the next occurrence of `event` only.
    fn once(&self, event: EventName, listener: Listener) -> ListenerId;

    /// Removes a listener. Returns `false` if it was not registered (or a
    /// one-shot listener already fired).
    fn off(&self, event: EventName, id: ListenerId) -> bool;
}

/// Event source of a connection, which also knows whether it is connected.
pub trait Socket: EventSource {
    fn is_connected(&self) -> bool;
}
