//! Local persistence: a string key-value area and the analysis history kept in it.

pub mod error;
pub mod history;
pub mod kv;

pub use error::StoreError;
pub use history::{HistoryFilter, HistorySort, HistoryStore, HISTORY_CAPACITY, HISTORY_STORAGE_KEY};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
