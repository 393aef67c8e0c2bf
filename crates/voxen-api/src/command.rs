// ── Command gateway ──
//
// Request/response boundary to the backend. Every call either yields a
// typed result or an `Error`; no call mutates client state by itself.

use async_trait::async_trait;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::Error;
use crate::types::{AppInfo, HistoryItem, Settings, Status};

/// Backend command names, exactly as the backend registers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CommandName {
    GetSettings,
    SaveSettings,
    GetHistory,
    ClearHistory,
    DeleteHistoryItem,
    GetModels,
    GetInputDevices,
    ManualTrigger,
    StopPipeline,
    GetStatus,
    GetAppInfo,
}

impl CommandName {
    /// Commands that change backend state.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::SaveSettings
                | Self::ClearHistory
                | Self::DeleteHistoryItem
                | Self::ManualTrigger
                | Self::StopPipeline
        )
    }
}

/// Typed access to every backend command.
///
/// Implemented by [`BridgeClient`](crate::BridgeClient) for a live backend
/// and by in-memory fakes in tests.
#[async_trait]
pub trait CommandGateway: Send + Sync {
    async fn get_settings(&self) -> Result<Settings, Error>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), Error>;

    /// History in chronological (insertion) order.
    async fn get_history(&self) -> Result<Vec<HistoryItem>, Error>;

    async fn clear_history(&self) -> Result<(), Error>;

    async fn delete_history_item(&self, id: &str) -> Result<(), Error>;

    async fn get_models(&self) -> Result<Vec<String>, Error>;

    async fn get_input_devices(&self) -> Result<Vec<String>, Error>;

    /// Ask the backend to advance the pipeline. The resulting status
    /// arrives later as a `status-changed` event.
    async fn manual_trigger(&self) -> Result<(), Error>;

    async fn stop_pipeline(&self) -> Result<(), Error>;

    async fn get_status(&self) -> Result<Status, Error>;

    async fn get_app_info(&self) -> Result<AppInfo, Error>;
}
