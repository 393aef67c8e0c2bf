mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use voxen_api::BridgeClient;
use voxen_core::Session;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::{Config, LoggingConfig};
use crate::error::CliError;

/// Env var holding an `EnvFilter` directive; overrides `-v` and config.
const LOG_ENV: &str = "VOXEN_LOG";

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();

    // A broken config only matters to commands that need the backend.
    let loaded = config::load_config();
    let defaults = loaded.as_ref().ok().cloned().unwrap_or_default();
    config::apply_defaults(&mut cli.global, &defaults);

    // Held until exit so the file writer flushes.
    let _log_guard = init_tracing(&cli.global, &defaults.logging);

    if let Err(err) = run(cli, loaded).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn init_tracing(global: &GlobalOpts, logging: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr_level = match (global.verbose, global.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    let filter = |fallback: &str| {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let mut layers: Vec<BoxedLayer> = vec![if logging.json {
        stderr_layer.json().with_filter(filter(stderr_level)).boxed()
    } else {
        stderr_layer.with_filter(filter(stderr_level)).boxed()
    }];

    let log_file = global.log_file.clone().or_else(|| {
        logging
            .directory
            .as_ref()
            .map(|dir| dir.join(config::LOG_FILE_NAME))
    });
    let guard = log_file.and_then(|path| {
        let (writer, guard) = file_writer(&path)?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        layers.push(if logging.json {
            file_layer.json().with_filter(filter(logging.level.as_str())).boxed()
        } else {
            file_layer.with_filter(filter(logging.level.as_str())).boxed()
        });
        Some(guard)
    });

    tracing_subscriber::registry().with(layers).init();
    guard
}

/// Non-blocking appender for `path`, creating its directory.
fn file_writer(path: &std::path::Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let name = path.file_name()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::never(&dir, name);
    Some(tracing_appender::non_blocking(appender))
}

async fn run(cli: Cli, loaded: Result<Config, voxen_config::ConfigError>) -> Result<(), CliError> {
    match cli.command {
        // Config commands work without a backend or a valid config file
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "voxen", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the backend
        cmd => {
            let cfg = loaded?;
            let url = config::backend_url(&cli.global, &cfg)?;
            let session = connect(&cli.global, &cfg, &url)?;

            tracing::debug!(command = ?cmd, backend = %url, "dispatching command");
            let result = commands::dispatch(cmd, &session, &url, &cli.global).await;
            session.shutdown().await;
            result.map_err(|e| e.with_backend(url.as_str()))
        }
    }
}

/// Build a session over a bridge client for `url`.
fn connect(global: &GlobalOpts, cfg: &Config, url: &url::Url) -> Result<Session, CliError> {
    let transport = config::transport_config(global, cfg)?;
    let client = Arc::new(
        BridgeClient::new(url.clone(), &transport).map_err(voxen_core::CoreError::from)?,
    );
    let color = output::should_color(&global.color_mode());

    Ok(Session::builder(client.clone(), client)
        .surface(Arc::new(output::TerminalSurface::new(color)))
        .config(cfg.session_config())
        .build())
}
