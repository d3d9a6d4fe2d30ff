use anyhow::Context;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::debug;

use super::{TimeTracker, TimeTrackingRecord};
use crate::config::AwsStorageDefaults;

/// Record store keeping one JSON array of records per device and day.
pub struct S3Repository {
    client: Client,
    bucket: String,
    base_path: Option<String>,
}

impl S3Repository {
    pub async fn new(storage: &AwsStorageDefaults) -> anyhow::Result<Self> {
        let bucket = storage
            .bucket
            .clone()
            .context("No S3 bucket specified for time tracking records")?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &storage.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let client = Client::new(&loader.load().await);

        tracing::info!(bucket = %bucket, "S3 time tracking repository created");

        Ok(Self {
            client,
            bucket,
            base_path: storage.base_path.clone(),
        })
    }

    async fn day_records(&self, key: &str) -> anyhow::Result<Vec<TimeTrackingRecord>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    return Ok(Vec::new());
                }
                return Err(err).with_context(|| format!("Failed to read {key}"));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read body of {key}"))?
            .into_bytes();

        serde_json::from_slice(&bytes).with_context(|| format!("Malformed records in {key}"))
    }
}

pub(crate) fn object_key(base_path: Option<&str>, device_id: &str, date: NaiveDate) -> String {
    let day = format!(
        "{}/{:04}/{:02}/{:02}.json",
        device_id,
        date.year(),
        date.month(),
        date.day()
    );
    match base_path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(base) => format!("{base}/{day}"),
        None => day,
    }
}

#[async_trait::async_trait]
impl TimeTracker for S3Repository {
    async fn list_records(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TimeTrackingRecord>> {
        let mut records = Vec::new();

        for date in start.date_naive().iter_days() {
            if date > end.date_naive() {
                break;
            }
            let key = object_key(self.base_path.as_deref(), device_id, date);
            debug!(bucket = %self.bucket, key = %key, "Reading time tracking records");
            records.extend(
                self.day_records(&key)
                    .await?
                    .into_iter()
                    .filter(|r| r.timestamp >= start && r.timestamp <= end),
            );
        }

        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        let date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        assert_eq!(
            object_key(Some("/timetracking/"), "Device01", date),
            "timetracking/Device01/2022/01/03.json"
        );
        assert_eq!(object_key(None, "Device01", date), "Device01/2022/01/03.json");
        assert_eq!(object_key(Some(""), "Device01", date), "Device01/2022/01/03.json");
    }
}
