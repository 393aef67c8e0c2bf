//! Settings command handlers.
//!
//! `set` edits the session's draft, shows the pending diff, then saves
//! through the store so the committed copy only moves on acknowledgement.

use voxen_core::{Session, Settings, SettingsDraft};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::output;

fn detail(settings: &Settings) -> String {
    [
        format!("Model:             {}", settings.model),
        format!("Microphone:        {}", settings.microphone),
        format!("Hotkey:            {}", settings.hotkey),
        format!(
            "Recording timeout: {} min",
            settings.recording_timeout_minutes
        ),
    ]
    .join("\n")
}

fn field_value(settings: &Settings, field: &str) -> String {
    match field {
        "model" => settings.model.clone(),
        "microphone" => settings.microphone.clone(),
        "hotkey" => settings.hotkey.clone(),
        "recording_timeout_minutes" => settings.recording_timeout_minutes.to_string(),
        _ => String::new(),
    }
}

/// `field: old -> new` for each pending change.
fn diff(draft: &SettingsDraft) -> Vec<String> {
    let committed = draft.committed();
    let pending = draft.draft();
    draft
        .changed_fields()
        .into_iter()
        .map(|field| {
            format!(
                "  {field}: {} -> {}",
                field_value(&committed, field),
                field_value(&pending, field)
            )
        })
        .collect()
}

fn apply(draft: &SettingsDraft, args: SettingsSetArgs) -> Result<(), CliError> {
    if let Some(model) = args.model {
        draft.set_model(model);
    }
    if let Some(microphone) = args.microphone {
        draft.set_microphone(microphone);
    }
    if let Some(hotkey) = args.hotkey {
        draft.set_hotkey(hotkey);
    }
    if let Some(minutes) = args.recording_timeout {
        draft.set_recording_timeout(minutes)?;
    }
    Ok(())
}

pub async fn handle(
    session: &Session,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = session.settings();
    store.fetch().await?;

    match args.command {
        SettingsCommand::Show => {
            let committed = store.committed();
            let out = output::render_single(&global.output(), &*committed, detail, |s| {
                s.model.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set(args) => {
            let dry_run = args.dry_run;
            let draft = store.draft();
            apply(draft, args)?;

            if !draft.is_dirty() {
                output::print_notice("Settings already match; nothing to save", global.quiet);
                return Ok(());
            }
            output::print_notice(
                &format!("Pending changes:\n{}", diff(draft).join("\n")),
                global.quiet,
            );
            if dry_run {
                return Ok(());
            }

            store.save().await?;
            let committed = store.committed();
            let out = output::render_single(&global.output(), &*committed, detail, |s| {
                s.model.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
