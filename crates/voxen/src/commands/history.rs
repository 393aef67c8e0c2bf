//! History command handlers.

use chrono::Local;
use tabled::Tabled;
use voxen_core::{HistoryItem, Session};

use crate::cli::{GlobalOpts, HistoryArgs, HistoryCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Instruction")]
    instruction: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&HistoryItem> for HistoryRow {
    fn from(item: &HistoryItem) -> Self {
        Self {
            id: item.id.clone(),
            when: local_time(item),
            instruction: util::truncate(&item.instruction, 40),
            result: util::truncate(&item.enriched_content, 60),
        }
    }
}

fn local_time(item: &HistoryItem) -> String {
    item.timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn detail(item: &HistoryItem) -> String {
    [
        format!("ID:          {}", item.id),
        format!("When:        {}", local_time(item)),
        format!("Instruction: {}", item.instruction),
        String::new(),
        "Original:".to_owned(),
        item.original_content.clone(),
        String::new(),
        "Enriched:".to_owned(),
        item.enriched_content.clone(),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let history = session.history();
    history.fetch().await?;

    match args.command {
        HistoryCommand::List { limit, recent } => {
            let items = if recent {
                session.recent_history()
            } else {
                let mut all = history.display();
                if let Some(limit) = limit {
                    all.truncate(limit);
                }
                all
            };
            if items.is_empty() {
                output::print_notice("No history yet", global.quiet);
                return Ok(());
            }
            let out = output::render_list(
                &global.output(),
                &items,
                |item| HistoryRow::from(item),
                |item| item.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Show { id } => {
            let item = history.require(&id)?;
            let out = output::render_single(&global.output(), &item, detail, |i| {
                i.enriched_content.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Delete { id } => {
            let item = history.require(&id)?;
            let prompt = format!(
                "Delete the run from {} (\"{}\")?",
                local_time(&item),
                util::truncate(&item.instruction, 30)
            );
            if !util::confirm(&prompt, "history delete", global.yes)? {
                return Ok(());
            }
            history.delete(&id).await?;
            output::print_notice(&format!("Deleted {id}"), global.quiet);
            Ok(())
        }

        HistoryCommand::Clear => {
            let count = history.len();
            if count == 0 {
                output::print_notice("History is already empty", global.quiet);
                return Ok(());
            }
            let prompt = format!("Delete all {count} history items?");
            if !util::confirm(&prompt, "history clear", global.yes)? {
                return Ok(());
            }
            history.clear().await?;
            output::print_notice(&format!("Cleared {count} items"), global.quiet);
            Ok(())
        }
    }
}
