//! Command dispatch: bridges CLI args -> session operations -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod history;
pub mod settings;
pub mod status;
pub mod util;
pub mod watch;

use url::Url;
use voxen_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    backend: &Url,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::show(session, global).await,
        Command::Trigger => status::trigger(session, global).await,
        Command::Stop => status::stop(session, global).await,
        Command::History(args) => history::handle(session, args, global).await,
        Command::Settings(args) => settings::handle(session, args, global).await,
        Command::Models => catalog::models(session, global).await,
        Command::Mics => catalog::microphones(session, global).await,
        Command::Info => catalog::info(session, backend, global).await,
        Command::Watch(args) => watch::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::ApiError {
            code: "internal".into(),
            message: "command does not use the backend".into(),
        }),
    }
}
