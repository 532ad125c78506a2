//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `RecordStore` - Hierarchy and submission reads
//! - `Clock` - Today's date for window boundaries
//! - `SnapshotCache` - Optional read-through cache of dashboard snapshots

mod clock;
mod record_store;
mod snapshot_cache;

pub use clock::{Clock, FixedClock, SystemClock};
pub use record_store::{CenterFilter, ClusterFilter, RecordStore, StoreError};
pub use snapshot_cache::{SnapshotCache, SnapshotKey};
