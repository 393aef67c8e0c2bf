use thiserror::Error;

/// Top-level error type for the `voxen-api` crate.
///
/// Covers every failure mode at the backend boundary: command transport,
/// backend rejections, the event socket, and payload decoding.
/// `voxen-core` maps these into session-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Commands ────────────────────────────────────────────────────
    /// The backend received the command and refused it.
    #[error("Backend rejected `{command}`: {message}")]
    Backend { command: String, message: String },

    // ── Events ──────────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// An event arrived on a topic this client does not know.
    #[error("Unknown event topic: {0}")]
    UnknownTopic(String),

    /// The event channel has been shut down.
    #[error("Event channel closed")]
    ChannelClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the backend answered and refused the command,
    /// as opposed to the command never arriving.
    pub fn is_backend_rejection(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
