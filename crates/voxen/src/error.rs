//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use voxen_config::ConfigError;
use voxen_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the voxen backend at {url}")]
    #[diagnostic(
        code(voxen::connection_failed),
        help(
            "Check that the voxen desktop app is running with its bridge enabled.\n\
             URL: {url}\n\
             Override with --backend or [backend].url in the config file."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(voxen::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Backend rejected `{command}`: {message}")]
    #[diagnostic(code(voxen::rejected))]
    Rejected { command: String, message: String },

    #[error("Cannot {action} while the pipeline is {status}")]
    #[diagnostic(
        code(voxen::invalid_state),
        help("Run: voxen status to see what the pipeline is doing")
    )]
    InvalidState { action: String, status: String },

    #[error("Unexpected response ({code}): {message}")]
    #[diagnostic(code(voxen::api_error))]
    ApiError { code: String, message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("History item '{id}' not found")]
    #[diagnostic(
        code(voxen::not_found),
        help("Run: voxen history list to see available items")
    )]
    NotFound { id: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(voxen::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Could not load configuration: {message}")]
    #[diagnostic(
        code(voxen::config),
        help(
            "Fix or recreate the file with: voxen config init --force\n\
             Expected at: {path}"
        )
    )]
    Config { message: String, path: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(voxen::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } | Self::InvalidState { .. } => exit_code::CONFLICT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ApiError { .. } | Self::Config { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Fill in the backend URL where the lower layers could not know it.
    #[must_use]
    pub fn with_backend(self, backend: &str) -> Self {
        match self {
            Self::ConnectionFailed { url, source } if url.is_empty() || url == "<unknown>" => {
                Self::ConnectionFailed {
                    url: backend.to_owned(),
                    source,
                }
            }
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::ChannelClosed => CliError::ConnectionFailed {
                url: String::new(),
                source: "event channel closed".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Rejected { command, message } => CliError::Rejected { command, message },

            CoreError::ValidationFailed { field, message } => CliError::Validation {
                field: field.into(),
                reason: message,
            },

            CoreError::HistoryItemNotFound { id } => CliError::NotFound { id },

            CoreError::UnexpectedResponse { message } => CliError::ApiError {
                code: "unexpected_response".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: voxen_config::config_path().display().to_string(),
            },
        }
    }
}
