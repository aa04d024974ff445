use crate::events::Emitter;
use crate::http::Agent;
use crate::timer::observe;
use crate::timing::Timings;
use bytes::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;

/// One timed exchange. The timings are kept even when the request failed.
pub struct TimedResponse {
    pub result: Result<Response<Bytes>, anyhow::Error>,
    pub timings: Timings,
}

impl TimedResponse {
    /// Observes a fresh request emitter, sends `request` through `agent` and
    /// snapshots the record once the exchange is over.
    pub async fn send(agent: &mut Agent, request: Request<Bytes>) -> Self {
        let events = Arc::new(Emitter::new());
        let timings = observe(&*events);
        let result = agent.send(request, events).await;
        Self {
            result,
            timings: timings.snapshot(),
        }
    }
}
