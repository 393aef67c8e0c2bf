//! CLI configuration: thin wrapper around `voxen_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--backend, --timeout, --output, --color).

use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;
use url::Url;
use voxen_api::TransportConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use voxen_config::{
    Config, LOG_FILE_NAME, LoggingConfig, config_path, load_config, load_config_or_default,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill `--output` and `--color` from the config when not given.
///
/// Unknown values in the config are logged and ignored.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = parse_value::<OutputFormat>("defaults.output", &cfg.defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_value::<ColorMode>("defaults.color", &cfg.defaults.color);
    }
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    let parsed = T::from_str(raw, true);
    if let Err(ref e) = parsed {
        warn!(field, value = raw, error = %e, "ignoring invalid config value");
    }
    parsed.ok()
}

/// Bridge URL: flag, then config.
pub fn backend_url(global: &GlobalOpts, cfg: &Config) -> Result<Url, CliError> {
    let raw = global.backend.as_deref().unwrap_or(&cfg.backend.url);
    Ok(voxen_config::parse_backend_url(raw)?)
}

/// Transport settings from the config with the `--timeout` override.
pub fn transport_config(global: &GlobalOpts, cfg: &Config) -> Result<TransportConfig, CliError> {
    let mut transport = cfg.transport_config();
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        transport.timeout = Duration::from_secs(secs);
    }
    Ok(transport)
}
