//! Core Data Models
//!
//! This module defines the primary data structures used throughout the metrics
//! reporting system. These models represent the complete data pipeline from raw
//! metric records to the final aggregate report.
//!
//! ## Data Flow
//!
//! The data flows through these models in the following sequence:
//!
//! 1. **Raw Data**: [`MetricRecord`] - One tracked client instance with its
//!    accumulated event history
//! 2. **Flattening**: [`FlattenedEntry`] - One record identity paired with
//!    exactly one meta-data entry
//! 3. **Output**: [`Report`], [`ErrorGroup`] - Serializable report produced at
//!    the end of a run
//!
//! ## Core Types
//!
//! ### Record Structure
//! - [`MetricRecord`] - Top-level record keyed by an opaque instance id
//! - [`MetaEntry`] - One timestamped event attached to a record
//! - [`EventData`] - The event payload (action, message, os, version)
//! - [`OsInfo`] - Operating system details reported by the client
//!
//! ### Report Generation
//! - [`Report`] - Immutable aggregate output for one report run
//! - [`ErrorGroup`] - One clustered error-message group in the report
//!
//! ## Features
//!
//! - **Serde Integration**: All wire types serialize with their camelCase
//!   field names (`metaData`, `startDate`, `idCount`, ...)
//! - **Optional Fields**: Handles missing data gracefully (records without
//!   meta data, events without os/version payloads)
//! - **Id Aliasing**: Accepts both `id` (record-store API) and `_id`
//!   (document-store exports) on input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested three-level tally: outer key -> middle key -> inner key -> count.
///
/// Used for both the version distribution (major -> minor -> patch) and the
/// OS distribution (type -> platform -> release). `BTreeMap` keeps the
/// serialized output deterministically ordered.
pub type NestedTally = BTreeMap<String, BTreeMap<String, BTreeMap<String, u64>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub created: String,
    #[serde(rename = "metaData", default)]
    pub meta_data: Vec<MetaEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaEntry {
    pub created: String,
    /// Server-side receipt timestamp, stamped by the record store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<String>,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsInfo {
    #[serde(rename = "type", default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
}

/// One record identity paired with exactly one parsed meta-data entry.
///
/// Produced transiently by the flattener and consumed immediately by the
/// aggregator; never persisted.
#[derive(Debug, Clone)]
pub struct FlattenedEntry {
    pub record_id: String,
    pub created: DateTime<Utc>,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(rename = "uniqueUsers")]
    pub unique_users: u64,
    #[serde(rename = "activeUsersByDate")]
    pub active_users_by_date: BTreeMap<String, u64>,
    pub version: NestedTally,
    #[serde(rename = "osInfo")]
    pub os_info: NestedTally,
    pub errors: Vec<ErrorGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorGroup {
    pub prototype: String,
    /// Deduplicated samples in first-seen order, truncated to ten.
    pub samples: Vec<String>,
    /// Total number of messages classified into the group, duplicates included.
    pub count: u64,
    #[serde(rename = "idCount")]
    pub id_count: u64,
}

impl MetricRecord {
    pub fn new(id: String, created: String) -> Self {
        Self {
            id,
            created,
            meta_data: Vec::new(),
        }
    }

    pub fn event_count(&self) -> usize {
        self.meta_data.len()
    }
}

impl EventData {
    pub fn action(action: &str) -> Self {
        Self {
            action: action.to_string(),
            message: None,
            os: None,
            version: None,
        }
    }

    /// True when the event is an error carrying a classifiable message.
    pub fn has_error_message(&self) -> bool {
        self.action == "error"
            && self
                .message
                .as_deref()
                .is_some_and(|m| !m.trim().is_empty())
    }
}
