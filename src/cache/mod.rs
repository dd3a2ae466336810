pub mod listeners;
pub mod report;
pub mod store;
pub mod time_bounded;

pub use listeners::SubscriptionId;
pub use report::{ErrorLog, ErrorLogReporter, ErrorReporter};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use time_bounded::{CacheError, TimeBoundedCache};
