//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn render_config(cfg: &Config, format: &OutputFormat) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_single(format, cfg, |_| String::new(), |_| String::new())
        }
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(cfg).map_err(|e| CliError::Config {
                message: e.to_string(),
                path: config::config_path().display().to_string(),
            })?
        }
    })
}

/// Ask for the backend URL when a terminal is attached; otherwise keep
/// the default.
fn prompt_backend(cfg: &mut Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref url) = global.backend {
        voxen_config::parse_backend_url(url)?;
        cfg.backend.url.clone_from(url);
        return Ok(());
    }
    if global.yes || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    let url: String = Input::new()
        .with_prompt("Backend URL")
        .default(cfg.backend.url.clone())
        .validate_with(|input: &String| {
            voxen_config::parse_backend_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;
    cfg.backend.url = url;
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = render_config(&cfg, &global.output())?;
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists()
                && !force
                && !util::confirm(
                    &format!("Overwrite {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let mut cfg = Config::default();
            prompt_backend(&mut cfg, global)?;
            config::save_config(&cfg)?;
            output::print_notice(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }
    }
}
