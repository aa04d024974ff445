//! Per-request HTTP timing.
//!
//! [`observe`] attaches to a request's lifecycle events and hands back a live
//! [`TimingHandle`] whose [`Timings`] fill in as the request makes progress:
//! socket assignment, DNS lookup, connect, TLS handshake, upload, first byte
//! and download, plus the phase durations between them.
//!
//! The observer only needs an [`EventSource`]. [`http::Agent`] is an HTTP/1.1
//! transport that emits those events over hyper and tokio.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate tracing;

pub mod app;
pub mod cli;
pub mod clock;
pub mod events;
pub mod http;
pub mod response;
pub mod timer;
pub mod timing;
pub mod tls;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use events::{Emitter, EventName, EventSource, Payload, Socket, SocketEmitter};
pub use timer::{observe, Timer, TimingHandle};
pub use timing::{Phases, Timings};
