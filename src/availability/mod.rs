//! Per-user availability records, their bounded collection, and the
//! file-backed store.

pub mod collection;
pub mod record;
pub mod store;

pub use collection::{SortOrder, UserAvailabilityCollection};
pub use record::AvailabilityRecord;
pub use store::{AvailabilityListing, AvailabilityStore, SkippedFile};
