//! Attendance and offering submissions, their collation and listing.

mod attendance;
mod collation;
mod header;
mod listing;
mod offering;
mod query;

pub use attendance::{total_attendance, AttendanceCounts, AttendanceSubmission};
pub use collation::{collate, CollatedRecord, CollationKey, LocationKey};
pub use header::{Submission, SubmissionHeader, SubmissionLevel};
pub use listing::{
    group_by_month, AttendanceBreakdown, CategoryCount, CollatedListing, ListingLabels,
    ListingPage, ListingQuery, ListingRow, ListingSort, MonthGroup, SubmissionDetail,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use offering::{total_offering, OfferingSplit, OfferingSubmission};
pub use query::{SortDirection, SubmissionQuery};
