// ── Session ──
//
// Facade over the status machine, the entity stores and the per-view
// listener managers. Backend events from every view funnel into one
// queue, and a single processor task applies them in arrival order.

use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use voxen_api::{BackendEvent, CommandGateway, EventChannel, HistoryItem, Status};

use crate::config::SessionConfig;
use crate::draft::SettingsDraft;
use crate::error::CoreError;
use crate::listener::{ListenerManager, View};
use crate::notify::{LogSurface, NotificationKind, NotificationSurface, Notifier};
use crate::status::{PipelineState, RequestOutcome, StatusMachine};
use crate::store::{CatalogStore, HistoryStore, SettingsStore};
use crate::stream::StateStream;

// ── Builder ──────────────────────────────────────────────────────────

/// Assembles a [`Session`] from its external collaborators.
pub struct SessionBuilder {
    gateway: Arc<dyn CommandGateway>,
    channel: Arc<dyn EventChannel>,
    surface: Arc<dyn NotificationSurface>,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Where notifications are shown. Defaults to [`LogSurface`].
    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn NotificationSurface>) -> Self {
        self.surface = surface;
        self
    }

    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Session {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let notifier = Arc::new(Notifier::new(self.surface));

        let manager = |view| {
            ListenerManager::new(
                view,
                Arc::clone(&self.channel),
                event_tx.clone(),
                cancel.clone(),
            )
        };

        let inner = SessionInner {
            status: StatusMachine::new(Arc::clone(&self.gateway)),
            history: HistoryStore::new(Arc::clone(&self.gateway), Arc::clone(&notifier)),
            settings: SettingsStore::new(Arc::clone(&self.gateway), Arc::clone(&notifier)),
            catalog: CatalogStore::new(Arc::clone(&self.gateway)),
            dashboard_view: manager(View::Dashboard),
            history_view: manager(View::History),
            settings_view: manager(View::Settings),
            notifier,
            config: self.config,
            event_rx: Mutex::new(Some(event_rx)),
            processor: Mutex::new(None),
            cancel,
        };

        Session {
            inner: Arc::new(inner),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Client-side state for one front end.
///
/// Cheaply cloneable. All clones share the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    notifier: Arc<Notifier>,
    status: StatusMachine,
    history: HistoryStore,
    settings: SettingsStore,
    catalog: CatalogStore,
    dashboard_view: ListenerManager,
    history_view: ListenerManager,
    settings_view: ListenerManager,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<BackendEvent>>>,
    processor: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Session {
    pub fn builder(
        gateway: Arc<dyn CommandGateway>,
        channel: Arc<dyn EventChannel>,
    ) -> SessionBuilder {
        SessionBuilder {
            gateway,
            channel,
            surface: Arc::new(LogSurface),
            config: SessionConfig::default(),
        }
    }

    /// Session with the log surface and default configuration.
    pub fn new(gateway: Arc<dyn CommandGateway>, channel: Arc<dyn EventChannel>) -> Self {
        Self::builder(gateway, channel).build()
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn status(&self) -> &StatusMachine {
        &self.inner.status
    }

    pub fn history(&self) -> &HistoryStore {
        &self.inner.history
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.inner.settings
    }

    pub fn draft(&self) -> &SettingsDraft {
        self.inner.settings.draft()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    pub fn pipeline(&self) -> StateStream<PipelineState> {
        self.inner.status.subscribe()
    }

    /// The dashboard strip: newest items first, capped by configuration.
    pub fn recent_history(&self) -> Vec<HistoryItem> {
        self.inner.history.recent(self.inner.config.recent_history_len)
    }

    fn manager(&self, view: View) -> &ListenerManager {
        match view {
            View::Dashboard => &self.inner.dashboard_view,
            View::History => &self.inner.history_view,
            View::Settings => &self.inner.settings_view,
        }
    }

    // ── View lifecycle ───────────────────────────────────────────────

    /// Subscribe the view's topics (once), then re-sync status and load
    /// the entities the view shows.
    pub async fn activate(&self, view: View) {
        self.ensure_processor().await;
        let newly = self.manager(view).activate().await;
        debug!(%view, newly, "view activated");
        self.refresh_view(view).await;
    }

    /// Dispose every subscription the view holds.
    pub async fn deactivate(&self, view: View) {
        self.manager(view).deactivate().await;
    }

    /// The view regained focus: pull the status again.
    pub async fn focus(&self, view: View) {
        debug!(%view, "view focused");
        let _ = self.resync_status().await;
    }

    pub async fn is_active(&self, view: View) -> bool {
        self.manager(view).is_active().await
    }

    /// Subscriptions currently registered on the event channel, across
    /// all views.
    pub fn outstanding_listeners(&self) -> usize {
        self.inner.dashboard_view.outstanding()
            + self.inner.history_view.outstanding()
            + self.inner.settings_view.outstanding()
    }

    async fn refresh_view(&self, view: View) {
        // Failures are logged by the stores; prior state is kept.
        let _ = self.resync_status().await;
        match view {
            View::Dashboard | View::History => {
                let _ = self.inner.history.fetch().await;
            }
            View::Settings => {
                let _ = tokio::join!(
                    self.inner.settings.fetch(),
                    self.inner.catalog.fetch_models(),
                    self.inner.catalog.fetch_microphones(),
                    self.inner.catalog.fetch_app_info(),
                );
            }
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    pub async fn request_advance(&self) -> Result<RequestOutcome, CoreError> {
        self.inner.status.request_advance().await
    }

    pub async fn request_cancel(&self) -> Result<RequestOutcome, CoreError> {
        self.inner.status.request_cancel().await
    }

    pub async fn resync_status(&self) -> Result<Status, CoreError> {
        self.inner.status.resync().await
    }

    pub fn apply_authoritative_status(&self, status: Status) {
        self.inner.status.apply_authoritative_status(status);
    }

    pub fn dismiss_notification(&self) -> bool {
        self.inner.status.dismiss_error()
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// Deactivate every view and stop the event processor.
    pub async fn shutdown(&self) {
        for view in [View::Dashboard, View::History, View::Settings] {
            self.manager(view).deactivate().await;
        }
        self.inner.cancel.cancel();

        let handle = self.inner.processor.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        info!("session shut down");
    }

    // ── Event processing ─────────────────────────────────────────────

    async fn ensure_processor(&self) {
        let Some(rx) = self.inner.event_rx.lock().await.take() else {
            return;
        };
        let handle = tokio::spawn(event_processor_task(
            Arc::downgrade(&self.inner),
            rx,
            self.inner.cancel.clone(),
        ));
        *self.inner.processor.lock().await = Some(handle);
    }

    async fn apply_event(&self, event: BackendEvent) {
        let inner = &self.inner;
        match event {
            BackendEvent::StatusChanged(status) => {
                inner.status.apply_authoritative_status(status);
            }
            BackendEvent::PipelineError { message } => {
                let notification = inner.notifier.raise(NotificationKind::PipelineError, message);
                inner.status.raise_error(notification);
            }
            BackendEvent::PipelineStatus { message } => {
                inner.status.set_progress(message);
            }
            BackendEvent::PipelineComplete => {
                inner.status.complete();
                let _ = inner.history.fetch().await;
            }
            BackendEvent::RecordingTimeout { message } => {
                let notification = inner
                    .notifier
                    .raise(NotificationKind::RecordingTimeout, message);
                inner.status.force_idle(notification);
            }
        }
    }
}

/// Applies queued backend events one at a time until cancelled or the
/// session is dropped.
async fn event_processor_task(
    session: Weak<SessionInner>,
    mut rx: mpsc::UnboundedReceiver<BackendEvent>,
    cancel: CancellationToken,
) {
    debug!("event processor started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                let Some(inner) = session.upgrade() else { break };
                let topic = event.topic();
                debug!(%topic, "applying event");
                Session { inner }.apply_event(event).await;
            }
        }
    }
    debug!("event processor stopped");
}
