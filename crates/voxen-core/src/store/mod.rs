// ── Entity stores ──
//
// Gateway-backed state slices. Fetches replace wholesale and keep the
// previous value on failure; mutations apply locally only after the
// backend acknowledges.

mod catalog;
mod history;
mod settings;
mod slot;

pub use catalog::CatalogStore;
pub use history::HistoryStore;
pub use settings::SettingsStore;

pub(crate) use slot::Slot;
