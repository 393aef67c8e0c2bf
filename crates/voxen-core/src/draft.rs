// ── Settings draft ──
//
// Two copies of `Settings`: the committed baseline (last successful
// fetch or save) and the draft the user is editing. `dirty` is derived
// from the pair and recomputed on every edit and every baseline change.

use std::sync::Arc;

use tokio::sync::watch;
use voxen_api::{RECORDING_TIMEOUT_RANGE, Settings};

use crate::error::CoreError;
use crate::store::Slot;

/// Whether `draft` differs from `committed` in any field.
pub fn is_dirty(draft: &Settings, committed: &Settings) -> bool {
    draft != committed
}

/// Names of the fields where `draft` differs from `committed`.
pub fn changed_fields(draft: &Settings, committed: &Settings) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if draft.model != committed.model {
        fields.push("model");
    }
    if draft.microphone != committed.microphone {
        fields.push("microphone");
    }
    if draft.hotkey != committed.hotkey {
        fields.push("hotkey");
    }
    if draft.recording_timeout_minutes != committed.recording_timeout_minutes {
        fields.push("recording_timeout_minutes");
    }
    fields
}

/// Check a settings value before it is sent to the backend.
pub fn validate(settings: &Settings) -> Result<(), CoreError> {
    for (field, value) in [("model", &settings.model), ("hotkey", &settings.hotkey)] {
        if value.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                field,
                message: "must not be empty".into(),
            });
        }
    }
    validate_timeout(settings.recording_timeout_minutes)
}

fn validate_timeout(minutes: u32) -> Result<(), CoreError> {
    if RECORDING_TIMEOUT_RANGE.contains(&minutes) {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed {
            field: "recording_timeout_minutes",
            message: format!(
                "{minutes} is outside {}..={}",
                RECORDING_TIMEOUT_RANGE.start(),
                RECORDING_TIMEOUT_RANGE.end()
            ),
        })
    }
}

/// Buffers edits to `Settings` against the last-saved baseline.
pub struct SettingsDraft {
    committed: Slot<Settings>,
    draft: Slot<Settings>,
    dirty: watch::Sender<bool>,
}

impl SettingsDraft {
    pub(crate) fn new(initial: Settings) -> Self {
        let (dirty, _) = watch::channel(false);
        Self {
            committed: Slot::new(initial.clone()),
            draft: Slot::new(initial),
            dirty,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn committed(&self) -> Arc<Settings> {
        self.committed.get()
    }

    pub fn draft(&self) -> Arc<Settings> {
        self.draft.get()
    }

    pub fn is_dirty(&self) -> bool {
        *self.dirty.borrow()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        changed_fields(&self.draft.get(), &self.committed.get())
    }

    /// Watch the dirty flag directly.
    pub fn subscribe_dirty(&self) -> watch::Receiver<bool> {
        self.dirty.subscribe()
    }

    // ── Edits ────────────────────────────────────────────────────────

    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        self.edit(|d| d.model = model);
    }

    pub fn set_microphone(&self, microphone: impl Into<String>) {
        let microphone = microphone.into();
        self.edit(|d| d.microphone = microphone);
    }

    pub fn set_hotkey(&self, hotkey: impl Into<String>) {
        let hotkey = hotkey.into();
        self.edit(|d| d.hotkey = hotkey);
    }

    /// Rejects values outside 1..=60 without touching the draft.
    pub fn set_recording_timeout(&self, minutes: u32) -> Result<(), CoreError> {
        validate_timeout(minutes)?;
        self.edit(|d| d.recording_timeout_minutes = minutes);
        Ok(())
    }

    /// Apply an arbitrary edit to the draft.
    pub fn edit(&self, f: impl FnOnce(&mut Settings)) {
        self.draft.update(f);
        self.recompute();
    }

    /// Throw away edits: draft := committed.
    pub fn discard(&self) {
        self.draft.set(Settings::clone(&self.committed.get()));
        self.recompute();
    }

    // ── Baseline changes ─────────────────────────────────────────────

    /// A fresh value from the backend: replace committed and reset the draft.
    pub(crate) fn reset_to(&self, settings: Settings) {
        self.committed.set(settings.clone());
        self.draft.set(settings);
        self.recompute();
    }

    /// The backend accepted `saved`: it becomes the baseline. Edits made
    /// while the save was in flight stay in the draft.
    pub(crate) fn commit(&self, saved: Settings) {
        self.committed.set(saved);
        self.recompute();
    }

    fn recompute(&self) {
        let dirty = is_dirty(&self.draft.get(), &self.committed.get());
        self.dirty.send_if_modified(|current| {
            let changed = *current != dirty;
            *current = dirty;
            changed
        });
    }
}
