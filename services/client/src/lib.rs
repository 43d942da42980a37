pub mod adapters;
pub mod config;
pub mod error;

pub use adapters::{BroadcastNotifier, HttpOrderApi, JsonFileStorage};
pub use config::Config;
pub use error::ClientError;
