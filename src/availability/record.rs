//! The persisted availability record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's statement that they will (or will not) be present at a given time.
///
/// Serialized with the field names of the per-user JSON files; the time is
/// stored as integer epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Display label at commit time. Informational only.
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(rename = "userIsAvailable")]
    pub is_available: bool,
    #[serde(rename = "userAvailabilityTime", with = "chrono::serde::ts_seconds")]
    pub availability_time: DateTime<Utc>,
    /// Reserved; always `false`.
    #[serde(rename = "userIsAvailablePerDefault", default)]
    pub is_default: bool,
}

impl AvailabilityRecord {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        is_available: bool,
        availability_time: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            is_available,
            availability_time,
            is_default: false,
        }
    }

    /// Map key used by the timestamp projection.
    #[must_use]
    pub fn timestamp_key(&self) -> i64 {
        self.availability_time.timestamp()
    }
}
