pub mod chat;
pub mod domain;
pub mod events;
pub mod orders;
pub mod ports;
pub mod storage;
pub mod thread_key;

pub use chat::{ChatStore, SendMessage};
pub use domain::{
    ChatMessage, ChatThread, NewOrder, Order, OrderItem, OrderStatus, Sender, UnreadCount,
};
pub use events::{Event, EventBus, EventKind, Subscription};
pub use orders::{OrderService, OrderStore};
pub use ports::{ChangeNotifier, OrderApi, PortError, PortResult, StorageBackend};
pub use storage::{MemoryStorage, MESSAGES_KEY, ORDERS_KEY, THREADS_KEY};
pub use thread_key::thread_key;
