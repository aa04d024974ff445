use super::{EventName, EventSource, Socket};

/// Runs `callback` once the socket is connected: right away if it already
/// is, otherwise on its next [`EventName::Connect`].
///
/// The check and the subscription are not atomic. Callers must attach this
/// from the same turn that will later emit `connect`, which is how
/// transports hand sockets out in their `socket` event.
pub fn defer_to_connect<F>(socket: &dyn Socket, callback: F)
where
    F: FnOnce() + Send + 'static,
{
    if socket.is_connected() {
        callback();
        return;
    }

    let mut callback = Some(callback);
    socket.once(
        EventName::Connect,
        Box::new(move |_| {
            if let Some(callback) = callback.take() {
                callback();
            }
        }),
    );
}
