//! Timestamps and the report date window.
//!
//! Every tally in a report is keyed by calendar day (UTC), so this module owns
//! the two date concerns the pipeline shares: parsing the timestamp strings
//! clients send, and enumerating the inclusive day window a report covers.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Day-key format used everywhere a date becomes a map key.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp string into a `DateTime<Utc>`.
/// Handles both Z suffix and timezone info formats, plus naive timestamps
/// assumed UTC.
pub fn parse_timestamp(timestamp_str: &str) -> Result<DateTime<Utc>> {
    let timestamp = if timestamp_str.ends_with('Z') {
        timestamp_str.replace('Z', "+00:00")
    } else {
        timestamp_str.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&timestamp) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }

    anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
}

/// Parse a `YYYY-MM-DD` argument into a calendar day.
pub fn parse_day(day_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(day_str, DAY_FORMAT)
        .map_err(|_| anyhow::anyhow!("Invalid date: {} (expected YYYY-MM-DD)", day_str))
}

/// Format a timestamp as its day key.
pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.date_naive().format(DAY_FORMAT).to_string()
}

/// Inclusive sequence of calendar days between `start` and `end`.
///
/// Iterative on purpose: a multi-year window must not grow the call stack.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if start > end {
        bail!("Invalid date window: {} is after {}", start, end);
    }

    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        cursor += Duration::days(1);
    }
    Ok(dates)
}

/// The inclusive day span one report run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Invalid date window: {} is after {}", start, end);
        }
        Ok(Self { start, end })
    }

    /// Rolling window of `days` calendar days ending today (UTC).
    pub fn last_days(days: u32) -> Result<Self> {
        if days == 0 {
            bail!("Report window must cover at least one day");
        }
        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days) - 1);
        Self::new(start, end)
    }

    /// Day-granularity containment test, inclusive of both endpoints.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        day >= self.start && day <= self.end
    }

    pub fn days(&self) -> Result<Vec<NaiveDate>> {
        dates_between(self.start, self.end)
    }

    pub fn start_key(&self) -> String {
        self.start.format(DAY_FORMAT).to_string()
    }

    pub fn end_key(&self) -> String {
        self.end.format(DAY_FORMAT).to_string()
    }
}
