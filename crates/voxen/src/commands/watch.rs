//! Live view of the pipeline.
//!
//! Activates the dashboard view and prints each published state until
//! interrupted (or after `--count` updates).

use chrono::Local;
use voxen_core::{HistoryItem, PipelineState, Session, View};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn state_line(state: &PipelineState, color: bool) -> String {
    let stamp = Local::now().format("%H:%M:%S");
    let mut line = format!(
        "{} {}",
        output::paint_dim(&stamp.to_string(), color),
        output::paint_status(state.status, color)
    );
    if let Some(ref progress) = state.progress {
        line.push_str(&format!("  {progress}"));
    }
    if let Some(ref error) = state.error {
        line.push_str(&format!("  {}", output::paint_error(&error.message, color)));
    }
    line
}

fn recent_lines(items: &[HistoryItem], color: bool) -> String {
    if items.is_empty() {
        return output::paint_dim("  (no history yet)", color);
    }
    items
        .iter()
        .map(|item| {
            format!(
                "  {} {}",
                output::paint_dim(&item.id, color),
                util::truncate(&item.enriched_content, 70)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Printer {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl Printer {
    fn state(&self, state: &PipelineState) {
        let out = match self.format {
            OutputFormat::Table | OutputFormat::Plain => state_line(state, self.color),
            _ => output::render_json_compact(state),
        };
        output::print_output(&out, self.quiet);
    }

    fn recent(&self, items: &[HistoryItem]) {
        let out = match self.format {
            OutputFormat::Table | OutputFormat::Plain => {
                format!("Recent:\n{}", recent_lines(items, self.color))
            }
            _ => output::render_json_compact(items),
        };
        output::print_output(&out, self.quiet);
    }
}

pub async fn handle(session: &Session, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Fail fast when the backend is down instead of watching nothing.
    session.resync_status().await?;
    session.activate(View::Dashboard).await;

    let printer = Printer {
        format: global.output(),
        color: output::should_color(&global.color_mode()),
        quiet: global.quiet,
    };
    printer.state(&session.status().snapshot());
    printer.recent(&session.recent_history());

    let mut pipeline = session.pipeline();
    let mut history = session.history().subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut remaining = args.count;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            Some(state) = pipeline.changed() => printer.state(&state),
            Some(_) = history.changed() => printer.recent(&session.recent_history()),
            else => break,
        }
        if let Some(n) = remaining.as_mut() {
            *n = n.saturating_sub(1);
            if *n == 0 {
                break;
            }
        }
    }

    session.deactivate(View::Dashboard).await;
    Ok(())
}
