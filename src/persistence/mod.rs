//! The `persistence` module keeps the offline queue durable across sessions.
//!
//! It uses `sled` as an embedded key-value store. The queue is a single JSON
//! array under a well-known key, next to the batch of a flush that is still
//! in progress and the last user id that submitted an expense.

pub mod sled_store;

pub use sled_store::{QueueStore, StoredQueue};
