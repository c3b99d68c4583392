use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error_handling::types::ConfigError;
use crate::live_detection::LiveSettings;
use crate::upload_analysis::{ReportFormat, UploadSettings, MAX_UPLOAD_BYTES};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Command line of the `vigil` binary.
///
/// Global flags override the values read from the configuration file. The server URL can also
/// be given through `VIGIL_SERVER_URL`.
#[derive(Parser, Debug, Clone)]
#[command(name = "vigil")]
#[command(version)]
#[command(about = "Client for a video violence detection service")]
pub struct Args {
    /// TOML configuration file
    ///
    /// Every field is optional, missing ones keep their default value.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the detection server
    #[arg(long, env = "VIGIL_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a live detection session until interrupted
    Live,
    /// Analyze a recorded video and optionally export the report
    Analyze {
        /// Video file to submit
        file: PathBuf,

        /// Report formats to write once the analysis completed
        #[arg(long = "export", value_enum, value_delimiter = ',')]
        exports: Vec<ReportFormat>,

        /// Directory receiving exported reports
        #[arg(long, env = "VIGIL_EXPORT_DIR")]
        out_dir: Option<PathBuf>,
    },
}

/// Runtime parameters of the client.
///
/// # Fields Overview
///
/// - `server_url`: base URL of the detection server
/// - `request_timeout_secs`: per-request timeout of the HTTP client
/// - `poll_interval_ms` / `poll_retry_ms`: live polling cadence after a success / a failure
/// - `alert_dismiss_secs`: lifetime of the violence alert overlay
/// - `chart_capacity` / `log_capacity`: sizes of the live chart and activity log
/// - `max_upload_bytes`: largest accepted video
/// - `export_dir`: where reports are written
/// - `camera_device`: capture device whose presence grants camera access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_retry_ms: u64,
    pub alert_dismiss_secs: u64,
    pub chart_capacity: usize,
    pub log_capacity: usize,
    pub max_upload_bytes: u64,
    pub export_dir: PathBuf,
    pub camera_device: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 60,
            poll_interval_ms: 500,
            poll_retry_ms: 2000,
            alert_dismiss_secs: 10,
            chart_capacity: 50,
            log_capacity: 20,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            export_dir: PathBuf::from("."),
            camera_device: None,
        }
    }
}

fn check_range(name: &str, value: u64, range: RangeInclusive<u64>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotInRange(format!(
            "{} = {} (expected {}..={})",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration: file (or defaults), then command line and
    /// environment overrides.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = &args.server_url {
            config.server_url = url.clone();
        }
        if let Command::Analyze {
            out_dir: Some(dir), ..
        } = &args.command
        {
            config.export_dir = dir.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(ConfigError::BadUrl(String::from("server URL is empty")));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadUrl(format!(
                "{} must start with http:// or https://",
                url
            )));
        }

        check_range("request_timeout_secs", self.request_timeout_secs, 1..=3600)?;
        check_range("poll_interval_ms", self.poll_interval_ms, 50..=60_000)?;
        check_range("poll_retry_ms", self.poll_retry_ms, 50..=600_000)?;
        check_range("alert_dismiss_secs", self.alert_dismiss_secs, 1..=3600)?;
        check_range("chart_capacity", self.chart_capacity as u64, 1..=10_000)?;
        check_range("log_capacity", self.log_capacity as u64, 1..=10_000)?;
        check_range("max_upload_bytes", self.max_upload_bytes, 1..=u64::MAX)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn live_settings(&self) -> LiveSettings {
        LiveSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            retry_interval: Duration::from_millis(self.poll_retry_ms),
            alert_dismiss_after: Duration::from_secs(self.alert_dismiss_secs),
            chart_capacity: self.chart_capacity,
            log_capacity: self.log_capacity,
            ..LiveSettings::default()
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            max_upload_bytes: self.max_upload_bytes,
            ..UploadSettings::default()
        }
    }
}
