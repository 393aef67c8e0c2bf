// ── Settings store ──
//
// Gateway-facing half of settings handling. The draft/committed pair
// lives in `SettingsDraft`; this store moves values between it and the
// backend.

use std::sync::Arc;

use tracing::{debug, info, warn};
use voxen_api::{CommandGateway, Settings};

use crate::draft::{self, SettingsDraft};
use crate::error::CoreError;
use crate::notify::{NotificationKind, Notifier};

pub struct SettingsStore {
    gateway: Arc<dyn CommandGateway>,
    notifier: Arc<Notifier>,
    draft: SettingsDraft,
}

impl SettingsStore {
    pub(crate) fn new(gateway: Arc<dyn CommandGateway>, notifier: Arc<Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            draft: SettingsDraft::new(Settings::default()),
        }
    }

    /// The draft/committed pair.
    pub fn draft(&self) -> &SettingsDraft {
        &self.draft
    }

    pub fn committed(&self) -> Arc<Settings> {
        self.draft.committed()
    }

    /// Replace committed with the backend's value and reset the draft to
    /// it. On failure both are kept and the error is only logged.
    pub async fn fetch(&self) -> Result<(), CoreError> {
        match self.gateway.get_settings().await {
            Ok(settings) => {
                debug!(model = %settings.model, "settings fetched");
                self.draft.reset_to(settings);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch settings");
                Err(e.into())
            }
        }
    }

    /// Send the current draft. Committed becomes the sent value only once
    /// the backend acknowledges; on failure committed is unchanged and the
    /// draft is kept for another attempt.
    pub async fn save(&self) -> Result<(), CoreError> {
        let candidate = Settings::clone(&self.draft.draft());
        draft::validate(&candidate)?;

        if let Err(e) = self.gateway.save_settings(&candidate).await {
            warn!(error = %e, "failed to save settings");
            self.notifier.raise(
                NotificationKind::MutationFailed,
                format!("Could not save settings: {e}"),
            );
            return Err(e.into());
        }

        info!(model = %candidate.model, "settings saved");
        self.draft.commit(candidate);
        Ok(())
    }
}
