//! Event socket with auto-reconnect and per-topic listener registry.
//!
//! Reads `{"event": "<topic>", "payload": <json>}` text frames from the
//! bridge WebSocket, decodes them into [`BackendEvent`]s and forwards each
//! to every sink registered for its topic. Reconnects with exponential
//! backoff + jitter until shut down.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::channel::{EventSink, ListenerId};
use crate::error::Error;
use crate::event::{BackendEvent, Topic};
use crate::transport::ReconnectConfig;

// ── EventHub ─────────────────────────────────────────────────────────

/// Owns the socket task and the listener registry.
pub(crate) struct EventHub {
    url: Url,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    registry: Arc<Registry>,
    started: AtomicBool,
}

impl EventHub {
    pub(crate) fn new(url: Url, reconnect: ReconnectConfig) -> Self {
        Self {
            url,
            reconnect,
            cancel: CancellationToken::new(),
            registry: Arc::new(Registry::default()),
            started: AtomicBool::new(false),
        }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn listen(&self, topic: Topic, sink: EventSink) -> Result<ListenerId, Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::ChannelClosed);
        }
        self.ensure_started();
        let id = self.registry.register(topic, sink);
        tracing::debug!(%id, %topic, "event listener registered");
        Ok(id)
    }

    pub(crate) fn unlisten(&self, id: ListenerId) {
        if self.registry.remove(id) {
            tracing::debug!(%id, "event listener removed");
        }
    }

    pub(crate) fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Spawn the socket loop on first use.
    fn ensure_started(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let url = self.url.clone();
        let registry = Arc::clone(&self.registry);
        let reconnect = self.reconnect.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            socket_loop(url, registry, reconnect, cancel).await;
        });
    }
}

// ── Registry ─────────────────────────────────────────────────────────

struct Registration {
    topic: Topic,
    sink: EventSink,
}

#[derive(Default)]
pub(crate) struct Registry {
    listeners: DashMap<ListenerId, Registration>,
    next_id: AtomicU64,
}

impl Registry {
    fn register(&self, topic: Topic, sink: EventSink) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners.insert(id, Registration { topic, sink });
        id
    }

    fn remove(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every sink on its topic. Sinks whose receiver
    /// is gone are dropped. Returns the number of deliveries.
    fn dispatch(&self, event: &BackendEvent) -> usize {
        let topic = event.topic();
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.listeners.iter().filter(|e| e.value().topic == topic) {
            if entry.value().sink.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        for id in dead {
            self.listeners.remove(&id);
            tracing::debug!(%id, "dropped listener with closed sink");
        }
        delivered
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn socket_loop(
    url: Url,
    registry: Arc<Registry>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &registry, &cancel) => {
                match result {
                    Ok(()) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tracing::info!("event socket disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "event socket error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "event socket reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = reconnect.backoff(attempt);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }
    }

    tracing::debug!("event socket loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection, read frames until it drops.
async fn connect_and_read(
    url: &Url,
    registry: &Registry,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to event socket");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("event socket connected");

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_dispatch(&text, registry);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        tracing::trace!("event socket ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        return match frame {
                            Some(cf) if cf.code != tungstenite::protocol::frame::coding::CloseCode::Normal => {
                                Err(Error::WebSocketClosed {
                                    code: cf.code.into(),
                                    reason: cf.reason.to_string(),
                                })
                            }
                            _ => {
                                tracing::info!("event socket close frame received");
                                Ok(())
                            }
                        };
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("event socket stream ended");
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Binary, Pong, Frame
                    }
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Raw frame the bridge sends over the socket.
#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Decode one text frame into a typed event.
fn parse_frame(text: &str) -> Result<BackendEvent, Error> {
    let frame: Frame = serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: format!("invalid event frame: {e}"),
        body: text.to_owned(),
    })?;
    let topic = Topic::from_str(&frame.event).map_err(|_| Error::UnknownTopic(frame.event))?;
    BackendEvent::decode(topic, &frame.payload)
}

/// Parse a text frame and hand the event to matching listeners.
/// Malformed frames are logged and skipped.
fn parse_and_dispatch(text: &str, registry: &Registry) {
    match parse_frame(text) {
        Ok(event) => {
            let delivered = registry.dispatch(&event);
            tracing::trace!(topic = %event.topic(), delivered, "event dispatched");
        }
        Err(Error::UnknownTopic(topic)) => {
            tracing::debug!(topic, "ignoring event on unknown topic");
        }
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed event frame");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
