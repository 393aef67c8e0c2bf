// Bridge client
//
// Reaches the capture backend through its local bridge endpoint:
// commands are `POST {base}/invoke/{command}` with a JSON object of named
// arguments, events arrive over a WebSocket at `{base}/events`.

mod socket;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::channel::{EventChannel, EventSink, ListenerId};
use crate::command::{CommandGateway, CommandName};
use crate::error::Error;
use crate::event::Topic;
use crate::transport::{ReconnectConfig, TransportConfig};
use crate::types::{AppInfo, HistoryItem, Settings, Status};

use self::socket::EventHub;

/// Cap on how much of an error body ends up in an error message.
const ERROR_BODY_PREVIEW: usize = 200;

/// HTTP + WebSocket client for the backend bridge.
///
/// Implements both [`CommandGateway`] and [`EventChannel`]. The event
/// socket is opened lazily on the first [`listen`](EventChannel::listen)
/// and torn down by [`shutdown`](Self::shutdown) or on drop.
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    hub: Arc<EventHub>,
}

impl BridgeClient {
    /// Create a bridge client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let events_url = events_url(&base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            hub: Arc::new(EventHub::new(events_url, transport.reconnect.clone())),
        })
    }

    /// Create a bridge client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        reconnect: ReconnectConfig,
    ) -> Result<Self, Error> {
        let events_url = events_url(&base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
            hub: Arc::new(EventHub::new(events_url, reconnect)),
        })
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The WebSocket URL events are read from.
    pub fn events_url(&self) -> &Url {
        self.hub.url()
    }

    /// Number of live event registrations.
    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }

    /// Stop the event socket. Later `listen` calls fail with
    /// [`Error::ChannelClosed`]; commands keep working.
    pub fn shutdown(&self) {
        self.hub.shutdown();
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn invoke_url(&self, command: CommandName) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/invoke/{command}"))?)
    }

    /// Send a command and decode its JSON result.
    async fn invoke<T: DeserializeOwned>(
        &self,
        command: CommandName,
        args: Value,
    ) -> Result<T, Error> {
        let url = self.invoke_url(command)?;
        if command.is_mutation() {
            info!(%command, "invoking backend command");
        } else {
            debug!(%command, "invoking backend command");
        }

        let resp = self
            .http
            .post(url)
            .json(&args)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                preview(trimmed).to_owned()
            };
            return Err(Error::Backend {
                command: command.to_string(),
                message,
            });
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("`{command}` returned unexpected JSON: {e}"),
            body: body.to_owned(),
        })
    }

    /// Send a command whose only result is an acknowledgement.
    async fn invoke_ack(&self, command: CommandName, args: Value) -> Result<(), Error> {
        self.invoke::<IgnoredAny>(command, args).await.map(|_| ())
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.hub.shutdown();
    }
}

// ── CommandGateway ───────────────────────────────────────────────────

#[async_trait]
impl CommandGateway for BridgeClient {
    async fn get_settings(&self) -> Result<Settings, Error> {
        self.invoke(CommandName::GetSettings, json!({})).await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), Error> {
        self.invoke_ack(CommandName::SaveSettings, json!({ "settings": settings }))
            .await
    }

    async fn get_history(&self) -> Result<Vec<HistoryItem>, Error> {
        self.invoke(CommandName::GetHistory, json!({})).await
    }

    async fn clear_history(&self) -> Result<(), Error> {
        self.invoke_ack(CommandName::ClearHistory, json!({})).await
    }

    async fn delete_history_item(&self, id: &str) -> Result<(), Error> {
        self.invoke_ack(CommandName::DeleteHistoryItem, json!({ "id": id }))
            .await
    }

    async fn get_models(&self) -> Result<Vec<String>, Error> {
        self.invoke(CommandName::GetModels, json!({})).await
    }

    async fn get_input_devices(&self) -> Result<Vec<String>, Error> {
        self.invoke(CommandName::GetInputDevices, json!({})).await
    }

    async fn manual_trigger(&self) -> Result<(), Error> {
        self.invoke_ack(CommandName::ManualTrigger, json!({})).await
    }

    async fn stop_pipeline(&self) -> Result<(), Error> {
        self.invoke_ack(CommandName::StopPipeline, json!({})).await
    }

    async fn get_status(&self) -> Result<Status, Error> {
        self.invoke(CommandName::GetStatus, json!({})).await
    }

    async fn get_app_info(&self) -> Result<AppInfo, Error> {
        self.invoke(CommandName::GetAppInfo, json!({})).await
    }
}

// ── EventChannel ─────────────────────────────────────────────────────

#[async_trait]
impl EventChannel for BridgeClient {
    async fn listen(&self, topic: Topic, sink: EventSink) -> Result<ListenerId, Error> {
        self.hub.listen(topic, sink)
    }

    fn unlisten(&self, id: ListenerId) {
        self.hub.unlisten(id);
    }
}

// ── URL helpers ──────────────────────────────────────────────────────

/// Derive the event socket URL: `http → ws`, `https → wss`, path `/events`.
fn events_url(base: &Url) -> Result<Url, Error> {
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let host = base.host_str().unwrap_or("localhost");
    let path = base.path().trim_end_matches('/');
    let raw = match base.port() {
        Some(p) => format!("{scheme}://{host}:{p}{path}/events"),
        None => format!("{scheme}://{host}{path}/events"),
    };
    Ok(Url::parse(&raw)?)
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn events_url_swaps_scheme_and_keeps_port() {
        let base = Url::parse("http://127.0.0.1:7878").unwrap();
        assert_eq!(events_url(&base).unwrap().as_str(), "ws://127.0.0.1:7878/events");

        let base = Url::parse("https://bridge.local/voxen/").unwrap();
        assert_eq!(events_url(&base).unwrap().as_str(), "wss://bridge.local/voxen/events");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(ERROR_BODY_PREVIEW + 10);
        assert_eq!(preview(&long).chars().count(), ERROR_BODY_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
