//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Record store backed by PostgreSQL
//! - `memory` - Record store held in process, for tests and local runs
//! - `cache` - Dashboard snapshot cache
//! - `http` - Axum REST API

pub mod cache;
pub mod http;
pub mod memory;
pub mod postgres;

pub use cache::InMemorySnapshotCache;
pub use http::{dashboard_routes, DashboardAppState};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
