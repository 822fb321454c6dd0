//! Event stream client: one long-lived connection to the snapshot
//! server, decoded into batches and status changes on an mpsc channel.
//!
//! The loop owns the whole transport policy — connect, decode, report,
//! back off, retry — so the state machine downstream only ever sees
//! `StreamEvent`s and can be tested by feeding synthetic ones.

pub mod decode;

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use dotwatch_protocol::{StreamStatus, TimelineBatch};

pub use decode::{SseDecoder, SseFrame};

/// Ceiling for the reconnect backoff.
const MAX_RETRY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// The event stream endpoint, e.g. `http://127.0.0.1:7878/events`.
    pub endpoint: Url,
    /// Which named event carries batches.
    pub event_name: String,
    /// Base reconnect delay; doubles per failed attempt up to `MAX_RETRY`
    /// and resets on a successful connect. A server `retry:` field
    /// overrides the next delay.
    pub initial_retry: Duration,
}

impl StreamConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            event_name: "graph".to_string(),
            initial_retry: Duration::from_secs(1),
        }
    }
}

/// What the connection loop reports to the UI task.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Connection state changed.
    Status(StreamStatus),
    /// A decoded batch arrived.
    Batch(TimelineBatch),
    /// A `graph` event payload failed to decode; the stream stays open.
    PayloadError(String),
}

/// Run the connection loop until the receiving side goes away.
///
/// Spawn this once at startup; it never returns while the UI listens.
pub async fn run(config: StreamConfig, tx: mpsc::Sender<StreamEvent>) {
    let client = reqwest::Client::new();
    let mut retry = config.initial_retry;

    loop {
        match connect(&client, &config).await {
            Ok(response) => {
                retry = config.initial_retry;
                if tx
                    .send(StreamEvent::Status(StreamStatus::Connected))
                    .await
                    .is_err()
                {
                    return;
                }
                if let Some(closed) = consume(response, &config, &tx, &mut retry).await {
                    debug!("stream closed: {closed}");
                } else {
                    // Receiver dropped; the viewer is gone.
                    return;
                }
            }
            Err(err) => {
                warn!("stream connect error: {err}");
            }
        }

        if tx
            .send(StreamEvent::Status(StreamStatus::Reconnecting))
            .await
            .is_err()
        {
            return;
        }
        tokio::time::sleep(retry).await;
        retry = next_backoff(retry);
    }
}

async fn connect(
    client: &reqwest::Client,
    config: &StreamConfig,
) -> Result<reqwest::Response, reqwest::Error> {
    let response = client
        .get(config.endpoint.clone())
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    response.error_for_status()
}

/// Pump the response body through the frame decoder until the stream
/// ends. Returns `None` when the receiver dropped, otherwise a short
/// description of why the stream closed.
async fn consume(
    response: reqwest::Response,
    config: &StreamConfig,
    tx: &mpsc::Sender<StreamEvent>,
    retry: &mut Duration,
) -> Option<String> {
    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => return Some(format!("transport error: {err}")),
        };
        for frame in decoder.feed(&chunk) {
            if let Some(delay) = frame.retry {
                *retry = delay.min(MAX_RETRY);
            }
            if frame.data.is_empty() || frame.event.as_deref() != Some(config.event_name.as_str())
            {
                continue;
            }
            let event = match TimelineBatch::decode(&frame.data) {
                Ok(batch) => StreamEvent::Batch(batch),
                Err(err) => {
                    warn!("invalid graph payload: {err}");
                    StreamEvent::PayloadError(err.to_string())
                }
            };
            if tx.send(event).await.is_err() {
                return None;
            }
        }
    }
    Some("server closed the stream".to_string())
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_RETRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let mut delay = Duration::from_secs(1);
        delay = next_backoff(delay);
        assert_eq!(delay, Duration::from_secs(2));
        for _ in 0..10 {
            delay = next_backoff(delay);
        }
        assert_eq!(delay, MAX_RETRY);
    }

    #[test]
    fn config_defaults_to_the_graph_event() {
        let config = StreamConfig::new(
            Url::parse("http://127.0.0.1:7878/events").expect("static url parses"),
        );
        assert_eq!(config.event_name, "graph");
        assert_eq!(config.initial_retry, Duration::from_secs(1));
    }
}
