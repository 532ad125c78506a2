//! Hierarchy model - the Region -> Cluster -> Center tree.

mod entities;
mod tree;

pub use entities::{Center, Cluster, Region, ServiceType};
pub use tree::Hierarchy;
