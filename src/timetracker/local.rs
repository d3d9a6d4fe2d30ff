use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{RecordType, TimeTracker, TimeTrackingRecord};

/// In-memory record store, used for local runs and tests.
#[derive(Debug, Default)]
pub struct LocalRepository {
    records: RwLock<HashMap<String, Vec<TimeTrackingRecord>>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self, device_id: &str, record_type: RecordType, timestamp: DateTime<Utc>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let device_records = records.entry(device_id.to_string()).or_default();
        device_records.push(TimeTrackingRecord {
            device_id: device_id.to_string(),
            record_type,
            timestamp,
            estimated: false,
        });
        device_records.sort_by_key(|r| r.timestamp);
    }
}

#[async_trait::async_trait]
impl TimeTracker for LocalRepository {
    async fn list_records(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TimeTrackingRecord>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .get(device_id)
            .map(|device_records| {
                device_records
                    .iter()
                    .filter(|r| r.timestamp >= start && r.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
