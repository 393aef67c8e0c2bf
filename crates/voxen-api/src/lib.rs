// voxen-api: Boundary contract and bridge client for the voxen capture backend

pub mod bridge;
pub mod channel;
pub mod command;
pub mod error;
pub mod event;
pub mod transport;
pub mod types;

pub use bridge::BridgeClient;
pub use channel::{EventChannel, EventSink, ListenerId};
pub use command::{CommandGateway, CommandName};
pub use error::Error;
pub use event::{BackendEvent, Topic};
pub use transport::{ReconnectConfig, TransportConfig};
pub use types::{AppInfo, BuildMode, HistoryItem, RECORDING_TIMEOUT_RANGE, Settings, Status};
