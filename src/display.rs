//! Output Formatting and Display
//!
//! Renders a finished [`Report`] for the terminal: either pretty JSON for
//! programmatic consumption or a colored human summary. Email delivery reuses
//! the JSON rendering; this module never mutates the report.

use crate::models::Report;
use anyhow::{Context, Result};
use colored::Colorize;

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the report the way every sink ships it.
    pub fn render_json(&self, report: &Report) -> Result<String> {
        serde_json::to_string_pretty(report).context("Failed to serialize report")
    }

    pub fn display(&self, report: &Report, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.render_json(report)?);
            return Ok(());
        }

        println!("\n{}", "=".repeat(72).bright_cyan());
        println!(
            "{}",
            format!(
                "Usage Report  {} .. {}",
                report.start_date, report.end_date
            )
            .bright_white()
            .bold()
        );
        println!("{}", "=".repeat(72).bright_cyan());

        println!(
            "\n{} {} unique instances • {} error groups\n",
            "📊".bright_yellow(),
            report.unique_users.to_string().bright_white().bold(),
            report.errors.len().to_string().bright_white().bold()
        );

        println!("{}", "Active instances by day".bright_white().bold());
        for (day, count) in &report.active_users_by_date {
            let count_str = if *count == 0 {
                count.to_string().dimmed().to_string()
            } else {
                count.to_string().bright_green().bold().to_string()
            };
            println!("  {}  {}", day.bright_cyan(), count_str);
        }

        if !report.version.is_empty() {
            println!("\n{}", "Versions".bright_white().bold());
            for (major, minors) in &report.version {
                for (minor, patches) in minors {
                    for (patch, count) in patches {
                        println!(
                            "  {}  {}",
                            format!("{major}.{minor}.{patch}").bright_cyan(),
                            count.to_string().bright_white()
                        );
                    }
                }
            }
        }

        if !report.os_info.is_empty() {
            println!("\n{}", "Operating systems".bright_white().bold());
            for (os_type, platforms) in &report.os_info {
                for (platform, releases) in platforms {
                    for (release, count) in releases {
                        println!(
                            "  {}  {}",
                            format!("{os_type}/{platform}/{release}").bright_cyan(),
                            count.to_string().bright_white()
                        );
                    }
                }
            }
        }

        if !report.errors.is_empty() {
            println!("\n{}", "Error groups".bright_white().bold());
            for group in &report.errors {
                println!(
                    "  {} {}  {}",
                    format!("{}x", group.count).bright_red().bold(),
                    format!("({} instances)", group.id_count).dimmed(),
                    group.prototype.bright_white()
                );
                for sample in group.samples.iter().skip(1) {
                    println!("      {}", sample.dimmed());
                }
            }
        }

        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorGroup;
    use std::collections::BTreeMap;

    fn sample_report() -> Report {
        let mut active = BTreeMap::new();
        active.insert("2025-01-01".to_string(), 1);
        active.insert("2025-01-02".to_string(), 0);

        Report {
            start_date: "2025-01-01".to_string(),
            end_date: "2025-01-02".to_string(),
            unique_users: 1,
            active_users_by_date: active,
            version: BTreeMap::new(),
            os_info: BTreeMap::new(),
            errors: vec![ErrorGroup {
                prototype: "disk full".to_string(),
                samples: vec!["disk full".to_string(), "disk is full".to_string()],
                count: 2,
                id_count: 2,
            }],
        }
    }

    #[test]
    fn json_rendering_uses_wire_field_names() {
        let json = DisplayManager::new().render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["startDate"], "2025-01-01");
        assert_eq!(value["uniqueUsers"], 1);
        assert_eq!(value["activeUsersByDate"]["2025-01-02"], 0);
        assert_eq!(value["errors"][0]["idCount"], 2);
        assert_eq!(value["errors"][0]["count"], 2);
    }
}
