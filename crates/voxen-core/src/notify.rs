// ── Notifications ──
//
// Transient user-facing outcomes. The core creates them; an external
// `NotificationSurface` shows them. Nothing here is persisted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

/// What kind of failure a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NotificationKind {
    /// The pipeline reported an error. Shown prominently.
    PipelineError,
    /// A recording stage hit its time cap.
    RecordingTimeout,
    /// A user-initiated change was refused or never arrived.
    MutationFailed,
}

/// A single user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Monotonic per-session sequence number.
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// External collaborator that displays notifications. Owns no state.
pub trait NotificationSurface: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Default surface: writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurface;

impl NotificationSurface for LogSurface {
    fn notify(&self, notification: &Notification) {
        tracing::warn!(
            id = notification.id,
            kind = %notification.kind,
            "{}",
            notification.message
        );
    }
}

/// Stamps notifications with ids and forwards them to the surface.
pub(crate) struct Notifier {
    surface: Arc<dyn NotificationSurface>,
    seq: AtomicU64,
}

impl Notifier {
    pub(crate) fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            seq: AtomicU64::new(0),
        }
    }

    /// Build a notification, show it, and hand it back for state tracking.
    pub(crate) fn raise(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: self.seq.fetch_add(1, Ordering::Relaxed) + 1,
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        };
        self.surface.notify(&notification);
        notification
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl NotificationSurface for Recorder {
        fn notify(&self, notification: &Notification) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(notification.clone());
            }
        }
    }

    #[test]
    fn raise_numbers_and_forwards() {
        let recorder = Arc::new(Recorder::default());
        let notifier = Notifier::new(Arc::clone(&recorder) as Arc<dyn NotificationSurface>);

        let first = notifier.raise(NotificationKind::PipelineError, "model offline");
        let second = notifier.raise(NotificationKind::MutationFailed, "save failed");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let seen = recorder.0.lock().map(|v| v.clone()).unwrap_or_default();
        assert_eq!(seen, vec![first, second]);
    }

    #[test]
    fn kind_names_are_kebab_case() {
        assert_eq!(NotificationKind::RecordingTimeout.to_string(), "recording-timeout");
    }
}
