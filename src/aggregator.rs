//! Streaming Aggregation
//!
//! Consumes flattened, date-filtered entries one at a time and maintains the
//! running tallies a report is built from: per-day active instance sets, the
//! unique-instance counter, and the nested version / OS distributions. Error
//! events are forwarded to the [`Classifier`] as they pass through.
//!
//! All state lives in a per-run [`AggregationState`]; nothing here is global,
//! so independent report runs can execute side by side and tests stay
//! deterministic. The aggregator is strictly single-writer: one entry mutates
//! the state at a time, and the stream is never buffered beyond the entry in
//! hand.
//!
//! Action dispatch per entry:
//! - `start` / `stop`: idempotent active-mark for the entry's day, unique-id
//!   bump, OS and version tallies when the payload carries them
//! - `error` with a non-blank message: classified
//! - anything else: ignored

use crate::classifier::Classifier;
use crate::dates::{day_key, ReportWindow};
use crate::models::{FlattenedEntry, NestedTally, OsInfo};
use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Fallback bucket for OS sub-fields the client left out.
const UNKNOWN: &str = "unknown";

/// Mutable tally state for one report run.
#[derive(Debug)]
pub struct AggregationState {
    window: ReportWindow,
    /// One entry per calendar day in the window, pre-initialized empty.
    dates: BTreeMap<String, HashSet<String>>,
    unique_ids: HashMap<String, u64>,
    version: NestedTally,
    os_info: NestedTally,
}

impl AggregationState {
    pub fn new(window: ReportWindow) -> Result<Self> {
        let mut dates = BTreeMap::new();
        for day in window.days()? {
            dates.insert(day.format(crate::dates::DAY_FORMAT).to_string(), HashSet::new());
        }

        Ok(Self {
            window,
            dates,
            unique_ids: HashMap::new(),
            version: NestedTally::new(),
            os_info: NestedTally::new(),
        })
    }

    pub fn window(&self) -> ReportWindow {
        self.window
    }

    pub fn dates(&self) -> &BTreeMap<String, HashSet<String>> {
        &self.dates
    }

    pub fn unique_ids(&self) -> &HashMap<String, u64> {
        &self.unique_ids
    }

    pub fn version(&self) -> &NestedTally {
        &self.version
    }

    pub fn os_info(&self) -> &NestedTally {
        &self.os_info
    }

    pub fn into_parts(self) -> (ReportWindow, BTreeMap<String, HashSet<String>>, HashMap<String, u64>, NestedTally, NestedTally) {
        (self.window, self.dates, self.unique_ids, self.version, self.os_info)
    }
}

/// Single-pass consumer of flattened entries for one report run.
#[derive(Debug)]
pub struct StreamAggregator {
    state: AggregationState,
    classifier: Classifier,
}

impl StreamAggregator {
    pub fn new(window: ReportWindow) -> Result<Self> {
        Ok(Self {
            state: AggregationState::new(window)?,
            classifier: Classifier::new(),
        })
    }

    pub fn with_classifier(window: ReportWindow, classifier: Classifier) -> Result<Self> {
        Ok(Self {
            state: AggregationState::new(window)?,
            classifier,
        })
    }

    /// Fold one entry into the run state.
    ///
    /// The caller filters entries to the report window first; an entry landing
    /// on a day the state does not know is a pipeline bug and fails the run.
    pub fn observe(&mut self, entry: &FlattenedEntry) -> Result<()> {
        match entry.data.action.as_str() {
            "start" | "stop" => self.observe_activity(entry),
            "error" => self.observe_error(entry),
            other => {
                debug!(action = other, record_id = %entry.record_id, "ignoring unrecognized action");
                Ok(())
            }
        }
    }

    fn observe_activity(&mut self, entry: &FlattenedEntry) -> Result<()> {
        let day = day_key(entry.created);
        let Some(active) = self.state.dates.get_mut(&day) else {
            bail!(
                "entry for record {} dated {} is outside the report window {}..={}",
                entry.record_id,
                day,
                self.state.window.start_key(),
                self.state.window.end_key()
            );
        };
        active.insert(entry.record_id.clone());

        *self
            .state
            .unique_ids
            .entry(entry.record_id.clone())
            .or_insert(0) += 1;

        if let Some(os) = &entry.data.os {
            tally_os(&mut self.state.os_info, os);
        }
        if let Some(version) = &entry.data.version {
            tally_version(&mut self.state.version, version);
        }

        Ok(())
    }

    fn observe_error(&mut self, entry: &FlattenedEntry) -> Result<()> {
        // Errors without a usable message carry no signal; skip them quietly.
        let Some(message) = entry.data.message.as_deref() else {
            return Ok(());
        };
        if message.trim().is_empty() {
            return Ok(());
        }
        self.classifier.classify(message, &entry.record_id)
    }

    pub fn state(&self) -> &AggregationState {
        &self.state
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn into_parts(self) -> (AggregationState, Classifier) {
        (self.state, self.classifier)
    }
}

fn tally_os(tally: &mut NestedTally, os: &OsInfo) {
    let os_type = os.os_type.as_deref().unwrap_or(UNKNOWN);
    let platform = os.platform.as_deref().unwrap_or(UNKNOWN);
    let release = os.release.as_deref().unwrap_or(UNKNOWN);
    bump(tally, os_type, platform, release);
}

/// Split a version string into exactly three components.
///
/// Missing minor/patch components normalize to "0"; anything past the second
/// dot stays attached to the patch component. Components remain strings, so
/// pre-release suffixes survive as-is.
fn tally_version(tally: &mut NestedTally, version: &str) {
    let mut parts = version.splitn(3, '.');
    let major = parts.next().unwrap_or("0");
    let minor = parts.next().unwrap_or("0");
    let patch = parts.next().unwrap_or("0");
    bump(tally, major, minor, patch);
}

fn bump(tally: &mut NestedTally, outer: &str, middle: &str, inner: &str) {
    *tally
        .entry(outer.to_string())
        .or_default()
        .entry(middle.to_string())
        .or_default()
        .entry(inner.to_string())
        .or_insert(0) += 1;
}
