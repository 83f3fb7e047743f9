//! Server-sent event stream for one connected client.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, Sse};
use futures_util::Stream;

use crate::registry::Subscription;

/// Default heartbeat period; keeps proxies from reaping idle streams.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// One unit written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Notification(Arc<str>),
    Heartbeat,
}

impl From<Frame> for Event {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Notification(payload) => Event::default().data(payload),
            Frame::Heartbeat => Event::default().event("ping").data("{}"),
        }
    }
}

/// Frames for `subscription`: each queued notification as it arrives,
/// interleaved with a heartbeat every `heartbeat`.
///
/// The subscription lives inside the stream. When the client goes away the
/// transport drops the stream, which deregisters the channel; a heartbeat
/// that cannot be written ends the connection the same way.
pub fn frames(mut subscription: Subscription, heartbeat: Duration) -> impl Stream<Item = Frame> {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(heartbeat);
        ticker.tick().await;

        loop {
            let frame = tokio::select! {
                payload = subscription.recv() => match payload {
                    Some(payload) => Frame::Notification(payload),
                    None => break,
                },
                _ = ticker.tick() => Frame::Heartbeat,
            };
            yield frame;
        }
    }
}

/// SSE response body for `subscription`.
pub fn sse(
    subscription: Subscription,
    heartbeat: Duration,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    use futures_util::StreamExt;

    Sse::new(frames(subscription, heartbeat).map(|frame| Ok(Event::from(frame))))
}
