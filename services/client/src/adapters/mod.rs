pub mod notify;
pub mod orders_api;
pub mod storage;

pub use notify::BroadcastNotifier;
pub use orders_api::HttpOrderApi;
pub use storage::JsonFileStorage;
