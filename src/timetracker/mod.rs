pub mod local;
pub mod s3;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use local::LocalRepository;
pub use s3::S3Repository;

/// Classification of a captured time tracking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Workday,
    Illness,
    Vacation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrackingRecord {
    pub device_id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub estimated: bool,
}

/// Source of captured time tracking records.
#[async_trait::async_trait]
pub trait TimeTracker: Send + Sync {
    /// Records of `device_id` captured within `start..=end`, ordered by timestamp.
    async fn list_records(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TimeTrackingRecord>>;
}
