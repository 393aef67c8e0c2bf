//! Clap derive structures for the `voxen` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// voxen -- drive the voice-capture pipeline from a terminal
#[derive(Debug, Parser)]
#[command(
    name = "voxen",
    version,
    about = "Control the voxen voice-capture and enrichment pipeline",
    long_about = "Talks to a running voxen backend over its bridge endpoint.\n\n\
        Advance or stop the pipeline, browse and prune run history, edit\n\
        capture settings, and watch status changes live.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend bridge URL (overrides config)
    #[arg(long, short = 'b', global = true, value_name = "URL")]
    pub backend: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "VOXEN_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Effective output format once config defaults are applied.
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current pipeline status
    #[command(alias = "st")]
    Status,

    /// Advance the pipeline to its next stage
    #[command(alias = "advance")]
    Trigger,

    /// Stop a run that is processing
    #[command(alias = "cancel")]
    Stop,

    /// Browse and prune run history
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Show or change capture settings
    Settings(SettingsArgs),

    /// List available language models
    Models,

    /// List available microphones
    #[command(alias = "microphones")]
    Mics,

    /// Show backend build and path information
    Info,

    /// Follow status, progress and history live
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List runs, most recent first
    #[command(alias = "ls")]
    List {
        /// Show at most this many runs
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Show only the recent-history strip (size from config)
        #[arg(long, conflicts_with = "limit")]
        recent: bool,
    },

    /// Show one run in full
    Show {
        /// History item ID
        id: String,
    },

    /// Delete one run
    #[command(alias = "rm")]
    Delete {
        /// History item ID
        id: String,
    },

    /// Delete every run
    Clear,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the saved settings
    Show,

    /// Change one or more settings
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("changes")
        .required(true)
        .multiple(true)
        .args(["model", "microphone", "hotkey", "recording_timeout"])
))]
pub struct SettingsSetArgs {
    /// Language model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Microphone identifier
    #[arg(long)]
    pub microphone: Option<String>,

    /// Global hotkey (e.g. "Ctrl+I")
    #[arg(long)]
    pub hotkey: Option<String>,

    /// Recording cap per stage, in minutes (1-60)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub recording_timeout: Option<u32>,

    /// Show what would change without saving
    #[arg(long)]
    pub dry_run: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file, prompting for the backend URL
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
