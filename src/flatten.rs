//! Record Flattener
//!
//! Expands one [`MetricRecord`] into a lazy sequence of [`FlattenedEntry`],
//! one per meta-data entry. Records without meta data yield an empty sequence
//! and are skipped, never an error. Each entry keeps the parent record's id so
//! downstream tallies can attribute activity to the instance that reported it.
//!
//! An entry whose `created` timestamp cannot be parsed is a malformed record;
//! that error flows out of the iterator and aborts the run upstream.

use crate::dates::parse_timestamp;
use crate::models::{FlattenedEntry, MetricRecord};
use anyhow::{Context, Result};

/// Flatten a record into per-event entries.
///
/// The returned iterator borrows nothing from the record beyond the call; the
/// pipeline holds at most one record's worth of entries at a time.
pub fn flatten_record(record: &MetricRecord) -> impl Iterator<Item = Result<FlattenedEntry>> + '_ {
    record.meta_data.iter().map(move |meta| {
        let created = parse_timestamp(&meta.created).with_context(|| {
            format!(
                "malformed meta-data entry on record {}: bad created timestamp",
                record.id
            )
        })?;

        Ok(FlattenedEntry {
            record_id: record.id.clone(),
            created,
            data: meta.data.clone(),
        })
    })
}
