//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the date window value object and the error
//! types that form the vocabulary of the portal domain.

mod date_window;
mod errors;
mod ids;

pub use date_window::DateWindow;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{CenterId, ClusterId, RegionId, ServiceTypeId, SubmissionId};
