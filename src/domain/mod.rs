//! Domain layer containing the portal's reporting logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, date window, errors)
//! - `hierarchy` - Region, cluster and center tree
//! - `scope` - Roles, access grants and location filters
//! - `submission` - Attendance and offering records, collation and listing
//! - `dashboard` - Summary totals and trend series

pub mod dashboard;
pub mod foundation;
pub mod hierarchy;
pub mod scope;
pub mod submission;
