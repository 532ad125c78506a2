//! In-memory adapters.

mod record_store;

pub use record_store::InMemoryRecordStore;
