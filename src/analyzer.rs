//! Report Pipeline
//!
//! This module provides the engine that orchestrates one complete report run.
//! It is the primary entry point for producing a [`Report`]: it wires the
//! record source into the flattener, the window filter, the aggregator (which
//! feeds the classifier), and finally the report builder.
//!
//! ## Processing Pipeline
//!
//! 1. **Ingest**: pull one [`MetricRecord`] at a time from the input source
//! 2. **Flatten**: expand the record into one entry per meta-data element
//! 3. **Filter**: drop entries whose day falls outside the report window
//! 4. **Aggregate**: fold each surviving entry into the run state, classifying
//!    error messages as they pass
//! 5. **Build**: read the final state once and emit the report
//!
//! The whole pipeline is a single pull-based pass: no stage runs ahead of the
//! aggregator, nothing is buffered beyond the record in hand, and the memory
//! footprint is the accumulated state plus one record. A run moves
//! Idle -> Initialized -> Streaming -> Finalized; any read, parse, or
//! validation error mid-stream aborts the run and no report is emitted — a
//! truncated input must never masquerade as a quiet month.

use crate::aggregator::StreamAggregator;
use crate::classifier::Classifier;
use crate::dates::ReportWindow;
use crate::flatten::flatten_record;
use crate::models::{MetricRecord, Report};
use crate::report::build_report;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Options for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub window: ReportWindow,
    /// Similarity threshold handed to the classifier.
    pub threshold: f64,
}

impl ReportOptions {
    pub fn new(window: ReportWindow) -> Self {
        Self {
            window,
            threshold: crate::classifier::DEFAULT_THRESHOLD,
        }
    }
}

pub struct ReportAnalyzer;

impl Default for ReportAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Run the full pipeline over a record source and build the report.
    ///
    /// The source yields `Result<MetricRecord>` so a stream that fails
    /// mid-read propagates as a run failure rather than a truncated report.
    pub fn run_report<I>(&self, records: I, options: &ReportOptions) -> Result<Report>
    where
        I: IntoIterator<Item = Result<MetricRecord>>,
    {
        let mut aggregator = StreamAggregator::with_classifier(
            options.window,
            Classifier::with_threshold(options.threshold),
        )?;

        let mut record_count = 0u64;
        let mut entry_count = 0u64;
        let mut skipped_count = 0u64;

        for record in records {
            let record = record.context("failed reading metric record stream")?;
            record_count += 1;

            for entry in flatten_record(&record) {
                let entry = entry?;
                if !options.window.contains(entry.created) {
                    skipped_count += 1;
                    continue;
                }
                entry_count += 1;
                aggregator.observe(&entry)?;
            }
        }

        debug!(
            records = record_count,
            entries = entry_count,
            skipped = skipped_count,
            "stream consumed"
        );

        let (state, classifier) = aggregator.into_parts();
        let report = build_report(state, classifier);
        info!(
            start = %report.start_date,
            end = %report.end_date,
            unique_users = report.unique_users,
            error_groups = report.errors.len(),
            "report finalized"
        );
        Ok(report)
    }
}
