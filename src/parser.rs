//! Record Input Sources
//!
//! The pipeline consumes `Result<MetricRecord>` items; this module produces
//! them. Three shapes of input are supported:
//!
//! - **JSONL streams**: one record per line, blank lines skipped. This is the
//!   streaming path — records are parsed one line at a time and never buffered
//!   as a whole. Stdin and spool files both use it.
//! - **Export documents**: a single `{"records": [...]}` JSON object, the
//!   format the record-store download tool emits. Bounded files only.
//! - **Spool directories**: `*.jsonl` / `*.json` files discovered under a data
//!   directory and processed in modification-time order.
//!
//! A line that fails to parse is an input-validation error and aborts the run;
//! a corrupt stream must not silently shrink the report.

use crate::models::MetricRecord;
use anyhow::{Context, Result};
use glob::glob;
use std::fs::{metadata, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Streaming JSONL reader yielding one record per non-blank line.
pub struct RecordStream<R: BufRead> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl RecordStream<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open record file: {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<MetricRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(e).with_context(|| {
                        format!("read failure at line {}", self.line_number)
                    }))
                }
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str::<MetricRecord>(line).with_context(|| {
                    format!("malformed metric record at line {}", self.line_number)
                }),
            );
        }
    }
}

/// Envelope shape produced by the record-store export tool.
#[derive(serde::Deserialize)]
struct RecordExport {
    records: Vec<MetricRecord>,
}

/// Parse a `{"records": [...]}` export document in one piece.
pub fn parse_export<R: Read>(reader: R) -> Result<Vec<MetricRecord>> {
    let export: RecordExport =
        serde_json::from_reader(reader).context("malformed record export document")?;
    Ok(export.records)
}

/// Find record spool files under a data directory, oldest modification first.
pub fn discover_record_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in ["*.jsonl", "*.json"] {
        let full = data_dir.join(pattern);
        if let Ok(paths) = glob(&full.to_string_lossy()) {
            for entry in paths.flatten() {
                files.push(entry);
            }
        }
    }

    files.sort_by_key(|path| {
        metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::UNIX_EPOCH)
    });

    debug!(count = files.len(), dir = %data_dir.display(), "discovered record files");
    Ok(files)
}

/// Where a report run's records come from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Stdin,
    Files(Vec<PathBuf>),
    DataDir(PathBuf),
}

impl RecordSource {
    /// Resolve a CLI `--input` value: `-` (or nothing) means stdin, a
    /// directory means spool discovery, anything else is a file path.
    pub fn from_input(input: Option<&str>) -> Result<Self> {
        match input {
            None | Some("-") => Ok(Self::Stdin),
            Some(path) => {
                let path = PathBuf::from(path);
                if path.is_dir() {
                    Ok(Self::DataDir(path))
                } else {
                    Ok(Self::Files(vec![path]))
                }
            }
        }
    }

    /// Open the source as one record iterator.
    ///
    /// Files ending in `.json` are treated as export documents; everything
    /// else streams as JSONL.
    pub fn into_records(self) -> Result<Box<dyn Iterator<Item = Result<MetricRecord>>>> {
        match self {
            Self::Stdin => {
                let stdin = std::io::stdin();
                Ok(Box::new(RecordStream::new(BufReader::new(stdin))))
            }
            Self::Files(paths) => records_from_files(paths),
            Self::DataDir(dir) => {
                let files = discover_record_files(&dir)?;
                records_from_files(files)
            }
        }
    }
}

fn records_from_files(paths: Vec<PathBuf>) -> Result<Box<dyn Iterator<Item = Result<MetricRecord>>>> {
    let mut chained: Box<dyn Iterator<Item = Result<MetricRecord>>> = Box::new(std::iter::empty());
    for path in paths {
        let is_export = path.extension().is_some_and(|ext| ext == "json");
        let next: Box<dyn Iterator<Item = Result<MetricRecord>>> = if is_export {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open record file: {}", path.display()))?;
            match parse_export(BufReader::new(file)) {
                Ok(records) => Box::new(records.into_iter().map(Ok)),
                Err(e) => Box::new(std::iter::once(Err(
                    e.context(format!("in export file {}", path.display()))
                ))),
            }
        } else {
            Box::new(RecordStream::open(&path)?)
        };
        chained = Box::new(chained.chain(next));
    }
    Ok(chained)
}
