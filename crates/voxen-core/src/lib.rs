//! Client-side state layer for voxen front ends.
//!
//! Mirrors backend-owned state and turns user intent into backend
//! commands. Nothing here decides what the pipeline does; the backend
//! is authoritative and this crate keeps a faithful, race-free view of it.
//!
//! - **[`Session`]** — Facade a front end holds. Activating a [`View`]
//!   subscribes that view's event topics, re-syncs the status and loads
//!   the entities it shows. Backend events from every view are applied
//!   by one processor task in arrival order.
//!
//! - **[`StatusMachine`]** — The pipeline status plus its progress text
//!   and error banner, published as one [`PipelineState`] snapshot.
//!   Local actions only *request* transitions.
//!
//! - **Stores** — [`HistoryStore`], [`SettingsStore`] (with its
//!   [`SettingsDraft`]) and [`CatalogStore`]. Mutations are pessimistic:
//!   local state changes only after the backend acknowledges.
//!
//! - **[`ListenerManager`]** — Subscription bookkeeping that never leaks
//!   a registration, even when a view goes away mid-subscribe.
//!
//! - **[`StateStream<T>`]** — Subscription handle with
//!   `current()` / `latest()` / `changed()` for reactive rendering.

pub mod config;
pub mod draft;
pub mod error;
pub mod listener;
pub mod notify;
pub mod session;
pub mod status;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use draft::SettingsDraft;
pub use error::CoreError;
pub use listener::{ListenerManager, Subscription, View};
pub use notify::{LogSurface, Notification, NotificationKind, NotificationSurface};
pub use session::{Session, SessionBuilder};
pub use status::{PipelineState, RequestOutcome, StatusMachine};
pub use store::{CatalogStore, HistoryStore, SettingsStore};
pub use stream::StateStream;

// Wire types callers need alongside the session.
pub use voxen_api::{AppInfo, BuildMode, HistoryItem, Settings, Status};
