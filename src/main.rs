use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use metrics_report::analyzer::{ReportAnalyzer, ReportOptions};
use metrics_report::config::get_config;
use metrics_report::dates::{parse_day, ReportWindow};
use metrics_report::delivery::{deliver, DeliveryMode};
use metrics_report::logging::init_logging;
use metrics_report::parser::RecordSource;

#[derive(Parser)]
#[command(name = "metrics-report")]
#[command(about = "Aggregate client usage metrics into windowed statistical reports")]
#[command(version = "1.0.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the aggregate report over a rolling date window
    Report {
        /// Window length in days, ending today
        #[arg(short, long)]
        days: Option<u32>,
        /// Explicit window start (YYYY-MM-DD, overrides --days)
        #[arg(long)]
        since: Option<String>,
        /// Explicit window end (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        until: Option<String>,
        /// Record input: a JSONL file, a .json export, a spool directory, or - for stdin
        #[arg(short, long)]
        input: Option<String>,
        /// Output raw JSON instead of the human summary
        #[arg(long)]
        json: bool,
        /// Email the report instead of printing it
        #[arg(long)]
        email: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Report {
        days: None,
        since: None,
        until: None,
        input: None,
        json: false,
        email: false,
    }) {
        Commands::Report {
            days,
            since,
            until,
            input,
            json,
            email,
        } => {
            let window = resolve_window(days, since, until, json);
            let options = ReportOptions {
                window,
                threshold: get_config().report.similarity_threshold,
            };

            match run_report(input, &options, json, email).await {
                Ok(()) => Ok(()),
                Err(e) => handle_error(e, json),
            }
        }
    }
}

async fn run_report(
    input: Option<String>,
    options: &ReportOptions,
    json: bool,
    email: bool,
) -> Result<()> {
    let source = RecordSource::from_input(input.as_deref())?;
    let records = source.into_records()?;

    let report = ReportAnalyzer::new().run_report(records, options)?;

    let mode = if email {
        DeliveryMode::Email
    } else {
        DeliveryMode::Stdout
    };
    deliver(&report, mode, json).await
}

fn resolve_window(
    days: Option<u32>,
    since: Option<String>,
    until: Option<String>,
    json: bool,
) -> ReportWindow {
    let parse_arg = |label: &str, value: &str| match parse_day(value) {
        Ok(day) => day,
        Err(_) => {
            if !json {
                eprintln!("❌ Invalid {} date format: {}. Use YYYY-MM-DD", label, value);
            }
            process::exit(1);
        }
    };

    let window = match (since, until) {
        (Some(since_str), until) => {
            let start = parse_arg("since", &since_str);
            let end = until
                .map(|u| parse_arg("until", &u))
                .unwrap_or_else(|| chrono::Utc::now().date_naive());
            ReportWindow::new(start, end)
        }
        (None, Some(until_str)) => {
            let end = parse_arg("until", &until_str);
            let days = days.unwrap_or_else(|| get_config().report.window_days);
            let start = end - chrono::Duration::days(i64::from(days.max(1)) - 1);
            ReportWindow::new(start, end)
        }
        (None, None) => {
            let days = days.unwrap_or_else(|| get_config().report.window_days);
            ReportWindow::last_days(days)
        }
    };

    match window {
        Ok(window) => window,
        Err(e) => {
            if !json {
                eprintln!("❌ {}", e);
            }
            process::exit(1);
        }
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({"error": e.to_string()}));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
