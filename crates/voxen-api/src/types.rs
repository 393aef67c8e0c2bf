// ── Wire types ──
//
// Values exchanged with the capture backend. Field names match the
// backend's snake_case JSON exactly.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Accepted values for [`Settings::recording_timeout_minutes`].
pub const RECORDING_TIMEOUT_RANGE: RangeInclusive<u32> = 1..=60;

// ── Status ───────────────────────────────────────────────────────────

/// Pipeline status as reported by the backend.
///
/// The happy path runs `idle → instruction → content → processing → success`,
/// and `success` returns to `idle` on the next push.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Instruction,
    Content,
    Processing,
    Success,
}

impl Status {
    /// Short human label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Instruction => "Listening for Instruction",
            Self::Content => "Listening for Content",
            Self::Processing => "Processing",
            Self::Success => "Done!",
        }
    }

    /// One-line prompt telling the user what the current stage expects.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Idle => "Press the global hotkey or trigger to start",
            Self::Instruction => "Describe what you want contributed",
            Self::Content => "Dictate the content to enrich",
            Self::Processing => "This may take a few minutes; the result lands on the clipboard",
            Self::Success => "",
        }
    }

    /// Whether a manual trigger is meaningful in this status.
    pub fn accepts_advance(self) -> bool {
        matches!(self, Self::Idle | Self::Instruction | Self::Content)
    }
}

// ── Settings ─────────────────────────────────────────────────────────

/// User-editable capture and model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enrichment model identifier, e.g. `"gemma3:4b"`.
    pub model: String,

    /// Input device name, or `"default"`.
    pub microphone: String,

    /// Global hotkey chord, e.g. `"Ctrl+I"`.
    pub hotkey: String,

    /// Per-stage recording cap in minutes.
    #[serde(default = "default_recording_timeout")]
    pub recording_timeout_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gemma3:4b".into(),
            microphone: "default".into(),
            hotkey: "Ctrl+I".into(),
            recording_timeout_minutes: default_recording_timeout(),
        }
    }
}

fn default_recording_timeout() -> u32 {
    10
}

// ── History ──────────────────────────────────────────────────────────

/// One completed capture-and-enrich run. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub instruction: String,
    pub original_content: String,
    pub enriched_content: String,
}

// ── App info ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
}

/// Diagnostic information about the running backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(alias = "buildMode")]
    pub build_mode: BuildMode,

    #[serde(default, alias = "appDataDir")]
    pub app_data_dir: Option<String>,

    #[serde(default, alias = "logDir")]
    pub log_dir: Option<String>,
}
