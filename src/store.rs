//! In-Memory Record Store
//!
//! The narrow storage collaborator the pipeline consumes: an append-only map
//! of metric records keyed by opaque instance id. Clients create a record once
//! and append timestamped meta-data entries to it over their lifetime; the
//! report job snapshots the store and streams the records through the
//! pipeline.
//!
//! Backed by a [`DashMap`] so concurrent client handlers can create and append
//! without an outer lock. The aggregation pipeline itself never touches the
//! store concurrently — it reads a point-in-time snapshot.

use crate::models::{EventData, MetaEntry, MetricRecord};
use anyhow::{bail, Result};
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use uuid::Uuid;

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<String, MetricRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Create a new empty record with a fresh id and return it.
    pub fn create(&self) -> Result<MetricRecord> {
        let id = Uuid::new_v4().to_string();
        let record = MetricRecord::new(id.clone(), now_timestamp());

        if self.records.contains_key(&id) {
            bail!("Record ID already exists: {id}");
        }
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// Fetch one record by id.
    pub fn get(&self, id: &str) -> Result<MetricRecord> {
        match self.records.get(id) {
            Some(record) => Ok(record.clone()),
            None => bail!("Record ID does not exist: {id}"),
        }
    }

    /// Append a client-reported event to an existing record.
    ///
    /// `created` is the client-side event time; the server-side receipt time
    /// is stamped here. Blank fields are rejected the same way the store API
    /// rejects them.
    pub fn append(&self, id: &str, created: &str, data: EventData) -> Result<()> {
        if created.trim().is_empty() {
            bail!("Invalid metaData.created for record {id}");
        }
        if data.action.trim().is_empty() {
            bail!("Invalid metaData.data for record {id}: missing action");
        }

        let Some(mut record) = self.records.get_mut(id) else {
            bail!("Record ID does not exist: {id}");
        };
        record.meta_data.push(MetaEntry {
            created: created.to_string(),
            recorded: Some(now_timestamp()),
            data,
        });
        Ok(())
    }

    /// Point-in-time snapshot of every record.
    pub fn get_all(&self) -> Vec<MetricRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    /// Snapshot shaped as a pipeline input source.
    pub fn records(&self) -> impl Iterator<Item = Result<MetricRecord>> {
        self.get_all().into_iter().map(Ok)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_record_is_retrievable_and_empty() {
        let store = RecordStore::new();
        let record = store.create().unwrap();

        let fetched = store.get(&record.id).unwrap();
        assert_eq!(fetched.id, record.id);
        assert!(fetched.meta_data.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn append_stamps_recorded_time() {
        let store = RecordStore::new();
        let record = store.create().unwrap();

        store
            .append(&record.id, "2025-01-01T08:00:00.000Z", EventData::action("start"))
            .unwrap();

        let fetched = store.get(&record.id).unwrap();
        assert_eq!(fetched.event_count(), 1);
        assert_eq!(fetched.meta_data[0].created, "2025-01-01T08:00:00.000Z");
        assert!(fetched.meta_data[0].recorded.is_some());
    }

    #[test]
    fn append_to_unknown_id_fails() {
        let store = RecordStore::new();
        let err = store
            .append("missing", "2025-01-01T08:00:00.000Z", EventData::action("start"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn append_validates_created_and_action() {
        let store = RecordStore::new();
        let record = store.create().unwrap();

        assert!(store.append(&record.id, "  ", EventData::action("start")).is_err());
        assert!(store
            .append(&record.id, "2025-01-01T08:00:00.000Z", EventData::action(""))
            .is_err());
        assert_eq!(store.get(&record.id).unwrap().event_count(), 0);
    }

    #[test]
    fn get_unknown_id_fails() {
        let store = RecordStore::new();
        assert!(store.get("nope").is_err());
    }

    #[test]
    fn snapshot_feeds_the_pipeline_shape() {
        let store = RecordStore::new();
        store.create().unwrap();
        store.create().unwrap();

        let records: Vec<_> = store.records().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(records.len(), 2);
    }
}
