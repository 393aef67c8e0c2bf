// ── Device and model catalogs ──
//
// Model identifiers, input devices and backend diagnostics. Each list is
// replaced wholesale on fetch and fetched independently of the others.

use std::sync::Arc;

use tracing::{debug, warn};
use voxen_api::{AppInfo, CommandGateway};

use crate::error::CoreError;
use crate::store::Slot;

pub struct CatalogStore {
    gateway: Arc<dyn CommandGateway>,
    models: Slot<Vec<String>>,
    microphones: Slot<Vec<String>>,
    app_info: Slot<Option<AppInfo>>,
}

impl CatalogStore {
    pub(crate) fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self {
            gateway,
            models: Slot::new(Vec::new()),
            microphones: Slot::new(Vec::new()),
            app_info: Slot::new(None),
        }
    }

    pub fn models(&self) -> Arc<Vec<String>> {
        self.models.get()
    }

    pub fn microphones(&self) -> Arc<Vec<String>> {
        self.microphones.get()
    }

    pub fn app_info(&self) -> Option<AppInfo> {
        Option::clone(&self.app_info.get())
    }

    pub async fn fetch_models(&self) -> Result<(), CoreError> {
        match self.gateway.get_models().await {
            Ok(models) => {
                debug!(count = models.len(), "models fetched");
                self.models.set(models);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch models");
                Err(e.into())
            }
        }
    }

    pub async fn fetch_microphones(&self) -> Result<(), CoreError> {
        match self.gateway.get_input_devices().await {
            Ok(devices) => {
                debug!(count = devices.len(), "input devices fetched");
                self.microphones.set(devices);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch input devices");
                Err(e.into())
            }
        }
    }

    /// Diagnostics only; failures are logged at debug level.
    pub async fn fetch_app_info(&self) -> Result<(), CoreError> {
        match self.gateway.get_app_info().await {
            Ok(info) => {
                self.app_info.set(Some(info));
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "app info unavailable");
                Err(e.into())
            }
        }
    }
}
