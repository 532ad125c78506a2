//! PostgreSQL adapters - Database implementations for the record store port.
//!
//! - `PostgresRecordStore` - Hierarchy, service type and submission reads

mod record_store;

pub use record_store::PostgresRecordStore;
