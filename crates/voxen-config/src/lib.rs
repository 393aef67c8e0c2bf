//! Shared configuration for the voxen front ends.
//!
//! One TOML file layered under `VOXEN_` environment variables, plus
//! translation into `voxen_api::TransportConfig` and
//! `voxen_core::SessionConfig`. The CLI adds flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use voxen_api::{ReconnectConfig, TransportConfig};
use voxen_core::SessionConfig;

/// File name used for logs written under the log directory.
pub const LOG_FILE_NAME: &str = "voxen.log";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub defaults: Defaults,
}

/// Where the backend bridge lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Bridge base URL (e.g., "http://127.0.0.1:7878").
    #[serde(default = "default_url")]
    pub url: String,

    /// Command timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,

    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive used when `VOXEN_LOG` is unset and no `-v` is given.
    #[serde(default = "default_level")]
    pub level: String,

    /// Write a log file here in addition to stderr.
    pub directory: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Items in the recent-history strip.
    #[serde(default = "default_recent")]
    pub recent: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            recent: default_recent(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:7878".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_reconnect_initial_ms() -> u64 {
    1000
}
fn default_reconnect_max_ms() -> u64 {
    30_000
}
fn default_level() -> String {
    "info".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_recent() -> usize {
    3
}

// ── Validation and translation ──────────────────────────────────────

impl Config {
    /// Check cross-field constraints figment cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend_url()?;
        if self.backend.timeout == 0 {
            return Err(validation("backend.timeout", "must be at least 1 second"));
        }
        if self.backend.reconnect_initial_ms > self.backend.reconnect_max_ms {
            return Err(validation(
                "backend.reconnect_initial_ms",
                format!(
                    "{} exceeds reconnect_max_ms ({})",
                    self.backend.reconnect_initial_ms, self.backend.reconnect_max_ms
                ),
            ));
        }
        if self.defaults.recent == 0 {
            return Err(validation("defaults.recent", "must be at least 1"));
        }
        Ok(())
    }

    /// Parsed bridge URL. Only `http` and `https` are accepted.
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        parse_backend_url(&self.backend.url)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.backend.timeout),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_millis(self.backend.reconnect_initial_ms),
                max_delay: Duration::from_millis(self.backend.reconnect_max_ms),
                max_retries: None,
            },
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            recent_history_len: self.defaults.recent,
        }
    }
}

/// Parse a bridge base URL, rejecting non-HTTP schemes.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| validation("backend.url", format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(validation(
            "backend.url",
            format!("expected http or https, got '{other}'"),
        )),
    }
}

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "voxen", "voxen")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for log files when the config does not name one.
pub fn default_log_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("logs"),
        |dirs| dirs.data_local_dir().join("logs"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("voxen");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `VOXEN_` env vars.
///
/// Nested keys use a double underscore: `VOXEN_BACKEND__URL`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VOXEN_").split("__"))
}

/// Load and validate the config layered over the file at `path`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.backend.url, "http://127.0.0.1:7878");
        assert_eq!(config.defaults.recent, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_overrides_defaults_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nurl = \"http://10.0.0.5:9000\"\n\n[defaults]\nrecent = 5\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.backend.url, "http://10.0.0.5:9000");
        assert_eq!(config.backend.timeout, 30);
        assert_eq!(config.defaults.recent, 5);
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.session_config().recent_history_len, 5);
    }

    #[test]
    fn save_then_load_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.backend.timeout = 5;
        config.logging.json = true;

        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = parse_backend_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "backend.url"));
        assert!(parse_backend_url("https://bridge.local:7878").is_ok());
    }

    #[test]
    fn rejects_inverted_reconnect_bounds() {
        let mut config = Config::default();
        config.backend.reconnect_initial_ms = 60_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn translates_transport_settings() {
        let mut config = Config::default();
        config.backend.timeout = 12;
        config.backend.reconnect_initial_ms = 250;

        let transport = config.transport_config();

        assert_eq!(transport.timeout, Duration::from_secs(12));
        assert_eq!(transport.reconnect.initial_delay, Duration::from_millis(250));
        assert_eq!(transport.reconnect.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn invalid_toml_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nurl = 1").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
    }
}
