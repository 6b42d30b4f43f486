use anyhow::Result;
use std::fs;
use std::path::Path;

/// Write a JSONL spool file of metric records into a test directory.
pub fn create_record_file(dir: &Path, filename: &str, lines: &[&str]) -> Result<()> {
    let file_path = dir.join(filename);
    fs::write(&file_path, lines.join("\n"))?;
    Ok(())
}

/// One metric record line with a single meta-data entry.
pub fn record_line(id: &str, created: &str, action: &str, message: Option<&str>) -> String {
    let data = match message {
        Some(message) => format!(r#"{{"action":"{action}","message":"{message}"}}"#),
        None => format!(r#"{{"action":"{action}"}}"#),
    };
    format!(
        r#"{{"id":"{id}","created":"{created}","metaData":[{{"created":"{created}","data":{data}}}]}}"#
    )
}
