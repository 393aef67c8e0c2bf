// ── Backend events ──
//
// Named push events and their decoded payloads. The backend emits
// payloads either as bare JSON strings or as `{ "message": ... }`
// objects; both decode to the same variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::Error;
use crate::types::Status;

/// Fallback text when a `recording-timeout` event carries no message.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "Recording stopped: time limit reached";

/// Event topics the backend pushes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Topic {
    StatusChanged,
    PipelineError,
    PipelineStatus,
    PipelineComplete,
    RecordingTimeout,
}

/// A decoded backend event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Authoritative new status.
    StatusChanged(Status),
    /// The pipeline failed; status is not implied.
    PipelineError { message: String },
    /// Free-form progress text for the current stage.
    PipelineStatus { message: String },
    /// A run finished and a history item was written.
    PipelineComplete,
    /// A recording stage hit its time cap. The backend resets to idle.
    RecordingTimeout { message: String },
}

impl BackendEvent {
    /// The topic this event was delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            Self::StatusChanged(_) => Topic::StatusChanged,
            Self::PipelineError { .. } => Topic::PipelineError,
            Self::PipelineStatus { .. } => Topic::PipelineStatus,
            Self::PipelineComplete => Topic::PipelineComplete,
            Self::RecordingTimeout { .. } => Topic::RecordingTimeout,
        }
    }

    /// Decode a raw payload received on `topic`.
    pub fn decode(topic: Topic, payload: &Value) -> Result<Self, Error> {
        match topic {
            Topic::StatusChanged => decode_status(payload).map(Self::StatusChanged),
            Topic::PipelineError => Ok(Self::PipelineError {
                message: message_text(payload).ok_or_else(|| malformed(topic, payload))?,
            }),
            Topic::PipelineStatus => Ok(Self::PipelineStatus {
                message: message_text(payload).ok_or_else(|| malformed(topic, payload))?,
            }),
            Topic::PipelineComplete => Ok(Self::PipelineComplete),
            Topic::RecordingTimeout => Ok(Self::RecordingTimeout {
                message: message_text(payload)
                    .unwrap_or_else(|| DEFAULT_TIMEOUT_MESSAGE.to_owned()),
            }),
        }
    }
}

fn decode_status(payload: &Value) -> Result<Status, Error> {
    let raw = match payload {
        Value::Object(map) => map.get("status").unwrap_or(payload),
        other => other,
    };
    serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
        message: format!("invalid status payload: {e}"),
        body: payload.to_string(),
    })
}

fn message_text(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}

fn malformed(topic: Topic, payload: &Value) -> Error {
    Error::Deserialization {
        message: format!("`{topic}` payload carries no message"),
        body: payload.to_string(),
    }
}
