//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Shorten `text` to at most `max` characters on one line, marking cuts.
pub fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    let cut = line.chars().count() > max || line.len() < text.trim_end().len();
    if !cut {
        return line.to_owned();
    }
    let kept: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("make it formal", 20), "make it formal");
    }

    #[test]
    fn long_text_is_cut_on_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
    }

    #[test]
    fn multiline_text_keeps_first_line() {
        assert_eq!(truncate("first\nsecond", 40), "first…");
    }

    #[test]
    fn yes_skips_the_prompt() {
        assert!(confirm("Delete?", "delete", true).unwrap_or(false));
    }
}
