//! Church Portal - Role-scoped attendance and offering dashboards
//!
//! Resolves what a portal user may see in the region, cluster and center
//! hierarchy, then collates and aggregates the attendance and offering
//! submissions inside that scope.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
