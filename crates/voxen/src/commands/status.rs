//! Status, trigger and stop handlers.

use serde::Serialize;
use voxen_core::{PipelineState, RequestOutcome, Session, Status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusView {
    status: Status,
    label: &'static str,
    hint: &'static str,
    progress: Option<String>,
    error: Option<String>,
}

impl From<&PipelineState> for StatusView {
    fn from(state: &PipelineState) -> Self {
        Self {
            status: state.status,
            label: state.status.label(),
            hint: state.status.hint(),
            progress: state.progress.clone(),
            error: state.error.as_ref().map(|n| n.message.clone()),
        }
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    let mut lines = vec![format!(
        "Status:   {}",
        output::paint_status(view.status, color)
    )];
    if !view.hint.is_empty() {
        lines.push(format!("          {}", output::paint_dim(view.hint, color)));
    }
    if let Some(ref progress) = view.progress {
        lines.push(format!("Progress: {progress}"));
    }
    if let Some(ref error) = view.error {
        lines.push(format!("Error:    {}", output::paint_error(error, color)));
    }
    lines.join("\n")
}

pub async fn show(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.resync_status().await?;
    let state = session.status().snapshot();
    let view = StatusView::from(&*state);
    let color = output::should_color(&global.color_mode());

    let out = output::render_single(
        &global.output(),
        &view,
        |v| detail(v, color),
        |v| v.status.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn trigger(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let from = session.resync_status().await?;
    match session.request_advance().await? {
        RequestOutcome::Sent => {
            output::print_notice(&format!("Advance requested (was: {})", from.label()), global.quiet);
            Ok(())
        }
        RequestOutcome::Ignored { status } => Err(CliError::InvalidState {
            action: "advance".into(),
            status: status.to_string(),
        }),
    }
}

pub async fn stop(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.resync_status().await?;
    match session.request_cancel().await? {
        RequestOutcome::Sent => {
            let now = session.status().status();
            output::print_notice(&format!("Pipeline stopped; now: {}", now.label()), global.quiet);
            Ok(())
        }
        RequestOutcome::Ignored { status } => Err(CliError::InvalidState {
            action: "stop".into(),
            status: status.to_string(),
        }),
    }
}
