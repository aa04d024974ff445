use bytes::Bytes;
use http_body_util::Full;
use hyper::body::{Body, Frame, SizeHint};
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

type OnFinish = Box<dyn FnOnce() + Send>;

/// Request body that reports when hyper has taken all of it.
///
/// The callback runs when the last frame is handed out, or when hyper drops
/// a body it never needed to poll (an empty one). Either way it runs once.
pub struct TrackedBody {
    inner: Full<Bytes>,
    on_finish: Option<OnFinish>,
}

impl TrackedBody {
    pub fn new<F>(bytes: Bytes, on_finish: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Full::new(bytes),
            on_finish: Some(Box::new(on_finish)),
        }
    }

    fn finish(&mut self) {
        if let Some(on_finish) = self.on_finish.take() {
            on_finish();
        }
    }
}

impl Body for TrackedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(None) => this.finish(),
            Poll::Ready(Some(_)) if this.inner.is_end_stream() => this.finish(),
            _ => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        if self.inner.is_end_stream() {
            self.finish();
        }
    }
}
