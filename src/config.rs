//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Report run configuration
    pub report: ReportConfig,

    /// Email delivery configuration
    pub email: EmailConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rolling window length in days when no explicit dates are given.
    pub window_days: u32,
    /// Similarity threshold for the error classifier.
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub domain: String,
    pub api_key: String,
    pub from: String,
    pub to: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_directory: PathBuf,
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            report: ReportConfig {
                window_days: 30,
                similarity_threshold: 0.6,
            },
            email: EmailConfig {
                domain: String::new(),
                api_key: String::new(),
                from: "Metrics Reports <reports@localhost>".to_string(),
                to: String::new(),
                subject: "Usage Stats Report".to_string(),
            },
            paths: PathsConfig {
                data_directory: dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("metrics-report"),
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        #[allow(unused_mut)]
        let mut config = Config::default();

        #[cfg(feature = "basic")]
        {
            let config_paths = [
                PathBuf::from("metrics-report.toml"),
                PathBuf::from(".metrics-report.toml"),
                dirs::config_dir()
                    .map(|d| d.join("metrics-report").join("config.toml"))
                    .unwrap_or_default(),
            ];

            for path in &config_paths {
                if path.exists() {
                    tracing::info!(config_file = %path.display(), "Loading configuration from file");
                    config = Self::load_from_file(path)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Report overrides
        if let Ok(val) = env::var("METRICS_REPORT_WINDOW_DAYS") {
            self.report.window_days = val.parse().context("Invalid METRICS_REPORT_WINDOW_DAYS")?;
        }
        if let Ok(val) = env::var("METRICS_REPORT_SIMILARITY_THRESHOLD") {
            self.report.similarity_threshold = val
                .parse()
                .context("Invalid METRICS_REPORT_SIMILARITY_THRESHOLD")?;
        }

        // Email overrides
        if let Ok(val) = env::var("MAILGUN_DOMAIN") {
            self.email.domain = val;
        }
        if let Ok(val) = env::var("MAILGUN_API_KEY") {
            self.email.api_key = val;
        }
        if let Ok(val) = env::var("METRICS_REPORT_EMAIL_FROM") {
            self.email.from = val;
        }
        if let Ok(val) = env::var("METRICS_REPORT_EMAIL_TO") {
            self.email.to = val;
        }
        if let Ok(val) = env::var("METRICS_REPORT_EMAIL_SUBJECT") {
            self.email.subject = val;
        }

        // Path overrides
        if let Ok(val) = env::var("METRICS_REPORT_DATA_DIR") {
            self.paths.data_directory = PathBuf::from(val);
        }
        if let Ok(val) = env::var("METRICS_REPORT_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.report.window_days == 0 {
            return Err(anyhow::anyhow!("Report window must be at least one day"));
        }

        if self.report.window_days > 3650 {
            warn!(
                window_days = self.report.window_days,
                "Report window is very long, runs may be slow"
            );
        }

        let threshold = self.report.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow::anyhow!(
                "Similarity threshold must be within [0.0, 1.0], got {}",
                threshold
            ));
        }

        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            std::fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            Config::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.report.window_days, 30);
        assert_eq!(config.report.similarity_threshold, 0.6);
        assert_eq!(config.email.subject, "Usage Stats Report");
    }

    #[test]
    fn test_env_override() {
        env::set_var("METRICS_REPORT_WINDOW_DAYS", "7");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.report.window_days, 7);
        env::remove_var("METRICS_REPORT_WINDOW_DAYS");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.report.window_days = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }
}
