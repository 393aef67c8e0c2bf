// ── Core error types ──
//
// Session-level errors from voxen-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<voxen_api::Error>`
// impl translates transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Event channel closed")]
    ChannelClosed,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("`{command}` rejected by backend: {message}")]
    Rejected { command: String, message: String },

    #[error("Validation failed for {field}: {message}")]
    ValidationFailed { field: &'static str, message: String },

    #[error("History item not found: {id}")]
    HistoryItemNotFound { id: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response from backend: {message}")]
    UnexpectedResponse { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<voxen_api::Error> for CoreError {
    fn from(err: voxen_api::Error) -> Self {
        match err {
            voxen_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            voxen_api::Error::InvalidUrl(e) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("invalid URL: {e}"),
            },
            voxen_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            voxen_api::Error::Backend { command, message } => {
                CoreError::Rejected { command, message }
            }
            voxen_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("event socket connection failed: {reason}"),
            },
            voxen_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("event socket closed (code {code}): {reason}"),
            },
            voxen_api::Error::ChannelClosed => CoreError::ChannelClosed,
            voxen_api::Error::UnknownTopic(topic) => CoreError::UnexpectedResponse {
                message: format!("unknown event topic `{topic}`"),
            },
            voxen_api::Error::Deserialization { message, body: _ } => {
                CoreError::UnexpectedResponse { message }
            }
        }
    }
}
