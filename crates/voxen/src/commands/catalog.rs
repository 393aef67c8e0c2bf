//! Model, microphone and backend-info handlers.

use serde::Serialize;
use tabled::Tabled;
use url::Url;
use voxen_core::{BuildMode, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "In use")]
    in_use: &'static str,
}

fn render_catalog(entries: &[String], current: Option<&str>, global: &GlobalOpts, empty: &str) {
    if entries.is_empty() {
        output::print_notice(empty, global.quiet);
        return;
    }
    let out = output::render_list(
        &global.output(),
        entries,
        |name| CatalogRow {
            name: name.clone(),
            in_use: if current == Some(name.as_str()) { "*" } else { "" },
        },
        Clone::clone,
    );
    output::print_output(&out, global.quiet);
}

pub async fn models(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.catalog().fetch_models().await?;
    // Only used to mark the selection.
    let _ = session.settings().fetch().await;

    let committed = session.settings().committed();
    render_catalog(
        &session.catalog().models(),
        Some(committed.model.as_str()),
        global,
        "No models available",
    );
    Ok(())
}

pub async fn microphones(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.catalog().fetch_microphones().await?;
    let _ = session.settings().fetch().await;

    let committed = session.settings().committed();
    render_catalog(
        &session.catalog().microphones(),
        Some(committed.microphone.as_str()),
        global,
        "No microphones found",
    );
    Ok(())
}

#[derive(Serialize)]
struct InfoView {
    backend: String,
    client_version: &'static str,
    build_mode: BuildMode,
    app_data_dir: Option<String>,
    log_dir: Option<String>,
}

fn detail(info: &InfoView) -> String {
    [
        format!("Backend:    {}", info.backend),
        format!("Client:     voxen {}", info.client_version),
        format!("Build:      {}", info.build_mode),
        format!(
            "Data dir:   {}",
            info.app_data_dir.as_deref().unwrap_or("-")
        ),
        format!("Log dir:    {}", info.log_dir.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

pub async fn info(session: &Session, backend: &Url, global: &GlobalOpts) -> Result<(), CliError> {
    session.catalog().fetch_app_info().await?;
    let Some(app) = session.catalog().app_info() else {
        return Err(CliError::ApiError {
            code: "unexpected_response".into(),
            message: "backend returned no app info".into(),
        });
    };

    let view = InfoView {
        backend: backend.to_string(),
        client_version: env!("CARGO_PKG_VERSION"),
        build_mode: app.build_mode,
        app_data_dir: app.app_data_dir,
        log_dir: app.log_dir,
    };
    let out = output::render_single(&global.output(), &view, detail, |v| {
        v.build_mode.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
