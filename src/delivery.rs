//! Report Delivery
//!
//! One finished report goes to exactly one sink: the terminal (default) or
//! email. Delivery failures surface to the caller and fail the run — the
//! report itself is already built and is never recomputed or retried here.
//!
//! Email goes out through the Mailgun messages API with a fixed subject from
//! configuration. The dependency is feature-gated (`email`); builds without it
//! reject the email sink with a clear error instead of silently printing.

use crate::config::get_config;
use crate::display::DisplayManager;
use crate::models::Report;
use anyhow::Result;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Stdout,
    Email,
}

/// Hand the report to its sink.
pub async fn deliver(report: &Report, mode: DeliveryMode, json_output: bool) -> Result<()> {
    let display = DisplayManager::new();
    match mode {
        DeliveryMode::Stdout => display.display(report, json_output),
        DeliveryMode::Email => {
            let config = get_config();
            let body = display.render_json(report)?;
            send_email(&config.email.subject, &body).await?;
            info!(to = %config.email.to, "report emailed");
            Ok(())
        }
    }
}

/// Send one message through the Mailgun REST API.
#[cfg(feature = "email")]
pub async fn send_email(subject: &str, text: &str) -> Result<()> {
    use anyhow::{bail, Context};

    let config = get_config();
    let email = &config.email;
    if email.domain.is_empty() || email.api_key.is_empty() {
        bail!("Email delivery is not configured: set mailgun domain and api key");
    }

    let url = format!("https://api.mailgun.net/v3/{}/messages", email.domain);
    let params = [
        ("from", email.from.as_str()),
        ("to", email.to.as_str()),
        ("subject", subject),
        ("text", text),
    ];

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .basic_auth("api", Some(&email.api_key))
        .form(&params)
        .send()
        .await
        .context("Failed to reach mail service")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Mail service rejected the report: {status} {body}");
    }

    Ok(())
}

#[cfg(not(feature = "email"))]
pub async fn send_email(_subject: &str, _text: &str) -> Result<()> {
    anyhow::bail!("This build does not include email delivery (enable the `email` feature)")
}
