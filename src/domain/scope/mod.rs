//! Access scope - who may see which part of the hierarchy.

mod access_scope;
mod errors;
mod location_filter;
mod role;

pub use access_scope::{AccessScope, LocationOverride};
pub use errors::ScopeError;
pub use location_filter::LocationFilter;
pub use role::{Role, UserScope};
