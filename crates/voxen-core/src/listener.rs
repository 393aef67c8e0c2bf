// ── Listener lifecycle ──
//
// Per-view event subscriptions. Activating a view subscribes to its
// topics exactly once; deactivating disposes every subscription exactly
// once, including ones whose `listen` call was still in flight when the
// view went away. In-flight `listen` futures are never dropped: they run
// to completion and a late handle is disposed immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use strum::{Display, EnumIter, EnumString};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use voxen_api::{EventChannel, EventSink, ListenerId, Topic};

// ── View ─────────────────────────────────────────────────────────────

/// A front-end surface whose activation owns a set of subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    Dashboard,
    History,
    Settings,
}

impl View {
    /// Topics this view listens to while active.
    pub fn topics(self) -> &'static [Topic] {
        match self {
            Self::Dashboard => &[
                Topic::StatusChanged,
                Topic::PipelineError,
                Topic::PipelineStatus,
                Topic::PipelineComplete,
                Topic::RecordingTimeout,
            ],
            Self::History | Self::Settings => &[],
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// One established registration on the event channel.
///
/// Disposal unregisters from the channel. It is idempotent and also
/// happens on drop.
pub struct Subscription {
    channel: Arc<dyn EventChannel>,
    topic: Topic,
    id: ListenerId,
    outstanding: Arc<AtomicUsize>,
    disposed: AtomicBool,
}

impl Subscription {
    fn new(
        channel: Arc<dyn EventChannel>,
        topic: Topic,
        id: ListenerId,
        outstanding: Arc<AtomicUsize>,
    ) -> Self {
        outstanding.fetch_add(1, Ordering::SeqCst);
        Self {
            channel,
            topic,
            id,
            outstanding,
            disposed: AtomicBool::new(false),
        }
    }

    /// Unregister from the channel. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.channel.unlisten(self.id);
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug!(topic = %self.topic, id = %self.id, "subscription disposed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ── ListenerManager ──────────────────────────────────────────────────

struct Activation {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the subscriptions of one view.
pub struct ListenerManager {
    view: View,
    channel: Arc<dyn EventChannel>,
    sink: EventSink,
    outstanding: Arc<AtomicUsize>,
    parent: CancellationToken,
    active: Mutex<Option<Activation>>,
}

impl ListenerManager {
    pub(crate) fn new(
        view: View,
        channel: Arc<dyn EventChannel>,
        sink: EventSink,
        parent: CancellationToken,
    ) -> Self {
        Self {
            view,
            channel,
            sink,
            outstanding: Arc::new(AtomicUsize::new(0)),
            parent,
            active: Mutex::new(None),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Live subscriptions, including ones established after deactivation
    /// that have not been disposed yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Subscribe to the view's topics. Returns `false` without touching
    /// the channel if the view is already active or the session is shut
    /// down.
    ///
    /// Resolves once every subscription attempt has settled.
    pub async fn activate(&self) -> bool {
        if self.parent.is_cancelled() {
            debug!(view = %self.view, "session shut down, not activating");
            return false;
        }
        let ready = {
            let mut active = self.active.lock().await;
            if active.is_some() {
                return false;
            }

            let cancel = self.parent.child_token();
            let (ready_tx, ready_rx) = oneshot::channel();
            let task = tokio::spawn(run_activation(
                self.view,
                Arc::clone(&self.channel),
                self.sink.clone(),
                Arc::clone(&self.outstanding),
                cancel.clone(),
                ready_tx,
            ));
            *active = Some(Activation { cancel, task });
            ready_rx
        };

        match ready.await {
            Ok(established) => {
                debug!(view = %self.view, established, "view subscriptions settled");
            }
            Err(_) => warn!(view = %self.view, "activation ended before settling"),
        }
        true
    }

    /// Dispose every subscription of the current activation and wait for
    /// in-flight `listen` calls to finish. Returns `false` if not active.
    pub async fn deactivate(&self) -> bool {
        let Some(activation) = self.active.lock().await.take() else {
            return false;
        };
        activation.cancel.cancel();
        if let Err(e) = activation.task.await {
            warn!(view = %self.view, error = %e, "listener task failed");
        }
        debug!(view = %self.view, "view deactivated");
        true
    }
}

/// Body of one activation: subscribe, report readiness, hold the
/// subscriptions until cancelled, then dispose them.
///
/// Every topic gets its `listen` call even when cancellation lands
/// midway; handles that resolve after cancellation are disposed at once.
async fn run_activation(
    view: View,
    channel: Arc<dyn EventChannel>,
    sink: EventSink,
    outstanding: Arc<AtomicUsize>,
    cancel: CancellationToken,
    ready: oneshot::Sender<usize>,
) {
    let mut subscriptions = Vec::with_capacity(view.topics().len());

    for &topic in view.topics() {
        // Not raced against `cancel`: the registration must be observed
        // so it can be undone.
        match channel.listen(topic, sink.clone()).await {
            Ok(id) => {
                let sub = Subscription::new(
                    Arc::clone(&channel),
                    topic,
                    id,
                    Arc::clone(&outstanding),
                );
                if cancel.is_cancelled() {
                    debug!(%view, %topic, "subscription resolved after deactivation");
                    sub.dispose();
                } else {
                    subscriptions.push(sub);
                }
            }
            Err(e) => warn!(%view, %topic, error = %e, "failed to subscribe"),
        }
    }

    let _ = ready.send(subscriptions.len());

    cancel.cancelled().await;
    for sub in &subscriptions {
        sub.dispose();
    }
}
