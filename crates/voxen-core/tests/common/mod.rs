// In-memory gateway, channel and surface for driving a `Session`.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;
use voxen_api::{
    AppInfo, BackendEvent, BuildMode, CommandGateway, CommandName, Error, EventChannel, EventSink,
    HistoryItem, ListenerId, Settings, Status, Topic,
};
use voxen_core::{Notification, NotificationSurface, Session, StateStream};

// ── Gateway ─────────────────────────────────────────────────────────

pub struct Backend {
    pub status: Status,
    pub settings: Settings,
    pub history: Vec<HistoryItem>,
    pub models: Vec<String>,
    pub microphones: Vec<String>,
    pub app_info: AppInfo,
    pub failing: HashSet<CommandName>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            settings: Settings::default(),
            history: Vec::new(),
            models: vec!["gemma3:4b".into(), "llama3".into()],
            microphones: vec!["default".into(), "USB Mic".into()],
            app_info: AppInfo {
                build_mode: BuildMode::Debug,
                app_data_dir: Some("/tmp/voxen".into()),
                log_dir: None,
            },
            failing: HashSet::new(),
        }
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub backend: Mutex<Backend>,
    calls: Mutex<Vec<CommandName>>,
}

impl FakeGateway {
    pub fn with(f: impl FnOnce(&mut Backend)) -> Arc<Self> {
        let gateway = Self::default();
        f(&mut gateway.backend.lock().unwrap());
        Arc::new(gateway)
    }

    pub fn edit(&self, f: impl FnOnce(&mut Backend)) {
        f(&mut self.backend.lock().unwrap());
    }

    pub fn fail(&self, command: CommandName) {
        self.backend.lock().unwrap().failing.insert(command);
    }

    pub fn recover(&self, command: CommandName) {
        self.backend.lock().unwrap().failing.remove(&command);
    }

    pub fn count(&self, command: CommandName) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == command).count()
    }

    fn call(&self, command: CommandName) -> Result<std::sync::MutexGuard<'_, Backend>, Error> {
        self.calls.lock().unwrap().push(command);
        let backend = self.backend.lock().unwrap();
        if backend.failing.contains(&command) {
            return Err(Error::Backend {
                command: command.to_string(),
                message: "refused by test backend".into(),
            });
        }
        Ok(backend)
    }
}

#[async_trait]
impl CommandGateway for FakeGateway {
    async fn get_settings(&self) -> Result<Settings, Error> {
        Ok(self.call(CommandName::GetSettings)?.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), Error> {
        self.call(CommandName::SaveSettings)?.settings = settings.clone();
        Ok(())
    }

    async fn get_history(&self) -> Result<Vec<HistoryItem>, Error> {
        Ok(self.call(CommandName::GetHistory)?.history.clone())
    }

    async fn clear_history(&self) -> Result<(), Error> {
        self.call(CommandName::ClearHistory)?.history.clear();
        Ok(())
    }

    async fn delete_history_item(&self, id: &str) -> Result<(), Error> {
        self.call(CommandName::DeleteHistoryItem)?
            .history
            .retain(|item| item.id != id);
        Ok(())
    }

    async fn get_models(&self) -> Result<Vec<String>, Error> {
        Ok(self.call(CommandName::GetModels)?.models.clone())
    }

    async fn get_input_devices(&self) -> Result<Vec<String>, Error> {
        Ok(self.call(CommandName::GetInputDevices)?.microphones.clone())
    }

    async fn manual_trigger(&self) -> Result<(), Error> {
        self.call(CommandName::ManualTrigger)?;
        Ok(())
    }

    async fn stop_pipeline(&self) -> Result<(), Error> {
        self.call(CommandName::StopPipeline)?.status = Status::Idle;
        Ok(())
    }

    async fn get_status(&self) -> Result<Status, Error> {
        Ok(self.call(CommandName::GetStatus)?.status)
    }

    async fn get_app_info(&self) -> Result<AppInfo, Error> {
        Ok(self.call(CommandName::GetAppInfo)?.app_info.clone())
    }
}

// ── Event channel ───────────────────────────────────────────────────

/// Counts registrations per topic. Optionally gates `listen` so a test
/// can hold a subscription in flight.
#[derive(Default)]
pub struct FakeChannel {
    next: AtomicU64,
    live: Mutex<HashMap<ListenerId, (Topic, EventSink)>>,
    listens: Mutex<HashMap<Topic, usize>>,
    unlistens: Mutex<HashMap<Topic, usize>>,
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every `listen` waits for a permit from [`release`](Self::release).
    /// Each call consumes exactly one permit.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        })
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn listens(&self, topic: Topic) -> usize {
        self.listens.lock().unwrap().get(&topic).copied().unwrap_or(0)
    }

    pub fn unlistens(&self, topic: Topic) -> usize {
        self.unlistens.lock().unwrap().get(&topic).copied().unwrap_or(0)
    }

    /// `listen` calls that have started but not yet returned.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    /// Deliver `event` to every live listener on its topic.
    pub fn emit(&self, event: BackendEvent) -> usize {
        let topic = event.topic();
        let live = self.live.lock().unwrap();
        live.values()
            .filter(|(t, _)| *t == topic)
            .filter(|(_, sink)| sink.send(event.clone()).is_ok())
            .count()
    }
}

#[async_trait]
impl EventChannel for FakeChannel {
    async fn listen(&self, topic: Topic, sink: EventSink) -> Result<ListenerId, Error> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let id = ListenerId::new(self.next.fetch_add(1, Ordering::SeqCst));
        *self.listens.lock().unwrap().entry(topic).or_default() += 1;
        self.live.lock().unwrap().insert(id, (topic, sink));
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        if let Some((topic, _)) = self.live.lock().unwrap().remove(&id) {
            *self.unlistens.lock().unwrap().entry(topic).or_default() += 1;
        }
    }
}

// ── Surface ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSurface(Mutex<Vec<Notification>>);

impl RecordingSurface {
    pub fn seen(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }
}

impl NotificationSurface for RecordingSurface {
    fn notify(&self, notification: &Notification) {
        self.0.lock().unwrap().push(notification.clone());
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub struct Harness {
    pub session: Session,
    pub gateway: Arc<FakeGateway>,
    pub channel: Arc<FakeChannel>,
    pub surface: Arc<RecordingSurface>,
}

pub fn harness(gateway: Arc<FakeGateway>, channel: Arc<FakeChannel>) -> Harness {
    let surface = Arc::new(RecordingSurface::default());
    let session = Session::builder(
        Arc::clone(&gateway) as Arc<dyn CommandGateway>,
        Arc::clone(&channel) as Arc<dyn EventChannel>,
    )
    .surface(Arc::clone(&surface) as Arc<dyn NotificationSurface>)
    .build();
    Harness {
        session,
        gateway,
        channel,
        surface,
    }
}

pub fn item(id: &str, minute: u32) -> HistoryItem {
    HistoryItem {
        id: id.into(),
        timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap(),
        instruction: format!("instruction {id}"),
        original_content: format!("original {id}"),
        enriched_content: format!("enriched {id}"),
    }
}

/// Wait for the next published value, failing the test after two seconds.
pub async fn next<T: Send + Sync + 'static>(stream: &mut StateStream<T>) -> Arc<T> {
    tokio::time::timeout(Duration::from_secs(2), stream.changed())
        .await
        .expect("timed out waiting for a state change")
        .expect("session dropped")
}
