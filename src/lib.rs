//! Metrics Report Library
//!
//! A Rust library for aggregating client-reported usage and error events into
//! periodic statistical reports. Clients report timestamped events (start,
//! stop, error) against opaque instance ids; this library consumes those
//! records as a stream and produces a report covering a rolling date window.
//!
//! ## Core Features
//!
//! - **Streaming aggregation**: One pull-based pass over an unbounded record
//!   stream with constant memory beyond the accumulated tallies
//! - **Error clustering**: Unsupervised grouping of free-text error messages
//!   by bigram similarity against per-group prototypes
//! - **Date windowing**: Inclusive day-granularity filtering with a
//!   pre-enumerated report window
//! - **Flexible delivery**: Pretty JSON, colored terminal summary, or email
//!
//! ## Architecture Overview
//!
//! The library is organized around several key modules:
//!
//! - [`models`] - Data structures for records, events, and the final report
//! - [`classifier`] - Similarity-based error-message grouping
//! - [`dates`] - Timestamp parsing and the report date window
//! - [`flatten`] - Expansion of records into per-event entries
//! - [`aggregator`] - Streaming tally state for one report run
//! - [`report`] - Final report assembly from run state
//! - [`analyzer`] - Pipeline orchestration (source to report)
//! - [`parser`] - Record input sources (JSONL streams, exports, spool dirs)
//! - [`store`] - In-memory append-only record store
//! - [`display`] / [`delivery`] - Output rendering and sinks
//! - [`config`] - Configuration management with environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Main Entry Point
//!
//! The primary interface is [`ReportAnalyzer`]:
//!
//! ```rust
//! use metrics_report::analyzer::{ReportAnalyzer, ReportOptions};
//! use metrics_report::dates::ReportWindow;
//!
//! # fn example() -> anyhow::Result<()> {
//! let window = ReportWindow::last_days(30)?;
//! let records = vec![]; // any IntoIterator<Item = anyhow::Result<MetricRecord>>
//! let report = ReportAnalyzer::new().run_report(records, &ReportOptions::new(window))?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod delivery;
pub mod display;
pub mod flatten;
pub mod logging;
pub mod models;
pub mod parser;
pub mod report;
pub mod store;

pub use analyzer::{ReportAnalyzer, ReportOptions};
pub use models::*;
