// ── Pipeline status machine ──
//
// Owns the single authoritative pipeline status plus the transient
// progress text and error banner that hang off it. Status is never
// computed locally: it is overwritten by backend pushes or pulls, and
// local actions only *request* transitions through the gateway.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use voxen_api::{CommandGateway, Status};

use crate::error::CoreError;
use crate::notify::Notification;
use crate::stream::StateStream;

/// Everything the status area renders, updated as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub status: Status,
    /// Progress text from `pipeline-status` events.
    pub progress: Option<String>,
    /// Prominent error banner.
    pub error: Option<Notification>,
}

/// Result of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The command was sent and acknowledged.
    Sent,
    /// The request is not valid in the current status; nothing was sent.
    Ignored { status: Status },
}

pub struct StatusMachine {
    gateway: Arc<dyn CommandGateway>,
    state: watch::Sender<Arc<PipelineState>>,
}

impl StatusMachine {
    pub(crate) fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        let (state, _) = watch::channel(Arc::new(PipelineState::default()));
        Self { gateway, state }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    pub fn snapshot(&self) -> Arc<PipelineState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<PipelineState> {
        StateStream::new(self.state.subscribe())
    }

    // ── Authoritative writes ─────────────────────────────────────────

    /// Overwrite the status with a backend-reported value. Always legal.
    /// Clears progress text and the error banner.
    pub fn apply_authoritative_status(&self, status: Status) {
        self.modify(|s| {
            s.status = status;
            s.progress = None;
            s.error = None;
        });
        debug!(%status, "status applied");
    }

    /// Force idle and show `notification`, as one update.
    pub(crate) fn force_idle(&self, notification: Notification) {
        self.modify(|s| {
            s.status = Status::Idle;
            s.progress = None;
            s.error = Some(notification);
        });
    }

    // ── Transient writes ─────────────────────────────────────────────

    pub(crate) fn set_progress(&self, message: String) {
        self.modify(|s| s.progress = Some(message));
    }

    /// Show an error banner. Does not touch the status.
    pub(crate) fn raise_error(&self, notification: Notification) {
        self.modify(|s| {
            s.progress = None;
            s.error = Some(notification);
        });
    }

    /// A run completed: drop progress text and any stale error.
    pub(crate) fn complete(&self) {
        self.modify(|s| {
            s.progress = None;
            s.error = None;
        });
    }

    /// Dismiss the error banner. Returns `false` if there was none.
    pub fn dismiss_error(&self) -> bool {
        let mut dismissed = false;
        self.state.send_if_modified(|slot| {
            if slot.error.is_none() {
                return false;
            }
            let mut next = PipelineState::clone(slot);
            next.error = None;
            *slot = Arc::new(next);
            dismissed = true;
            true
        });
        dismissed
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Ask the backend to advance the pipeline.
    ///
    /// Valid in idle, instruction and content. Elsewhere this sends
    /// nothing and returns [`RequestOutcome::Ignored`]. The status itself
    /// changes only when the backend pushes the new value.
    pub async fn request_advance(&self) -> Result<RequestOutcome, CoreError> {
        let status = self.status();
        if !status.accepts_advance() {
            debug!(%status, "advance ignored");
            return Ok(RequestOutcome::Ignored { status });
        }

        self.gateway.manual_trigger().await.map_err(|e| {
            warn!(error = %e, "manual trigger failed");
            CoreError::from(e)
        })?;
        info!(from = %status, "advance requested");
        Ok(RequestOutcome::Sent)
    }

    /// Ask the backend to stop processing, then pull the status back.
    ///
    /// Valid only while processing. The re-sync happens whether or not
    /// the stop succeeded, and whatever status comes back is accepted.
    pub async fn request_cancel(&self) -> Result<RequestOutcome, CoreError> {
        let status = self.status();
        if status != Status::Processing {
            debug!(%status, "cancel ignored");
            return Ok(RequestOutcome::Ignored { status });
        }

        let stopped = self.gateway.stop_pipeline().await;
        if let Err(ref e) = stopped {
            warn!(error = %e, "stop pipeline failed");
        }

        // Failure already logged inside resync.
        let _ = self.resync().await;

        stopped.map_err(CoreError::from)?;
        info!("cancel requested");
        Ok(RequestOutcome::Sent)
    }

    /// Pull the status from the backend and apply it as authoritative.
    /// On failure the current state is kept.
    pub async fn resync(&self) -> Result<Status, CoreError> {
        match self.gateway.get_status().await {
            Ok(status) => {
                self.apply_authoritative_status(status);
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "status resync failed");
                Err(e.into())
            }
        }
    }

    fn modify(&self, f: impl FnOnce(&mut PipelineState)) {
        self.state.send_modify(|slot| {
            let mut next = PipelineState::clone(slot);
            f(&mut next);
            *slot = Arc::new(next);
        });
    }
}
