// ── Event channel ──
//
// Asynchronous push boundary. Consumers register a sink per topic and
// receive decoded events on it until they unlisten.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::event::{BackendEvent, Topic};

/// Where a listener's events are delivered.
pub type EventSink = mpsc::UnboundedSender<BackendEvent>;

/// Opaque handle identifying one registration on an [`EventChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Subscription interface to backend push events.
///
/// `listen` may suspend while the registration is established. Every id it
/// returns must eventually be passed to `unlisten` exactly once.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Register `sink` for events on `topic`.
    async fn listen(&self, topic: Topic, sink: EventSink) -> Result<ListenerId, Error>;

    /// Remove a registration. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);
}
