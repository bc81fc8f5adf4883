use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use roster_engine::ClientSettings;
use serde::Deserialize;

use super::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "roster_app.ron";
pub const LOG_FILE: &str = "roster_app.log";

#[derive(Debug, Parser)]
#[command(name = "roster_app")]
#[command(about = "Upload a roster spreadsheet, preview its staff and download the generated duty roster")]
pub struct Cli {
    /// RON config file (default: ./roster_app.ron when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the roster backend
    #[arg(long)]
    pub server: Option<String>,

    /// Directory generated rosters are saved into
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Where log lines go
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            output_dir: PathBuf::from("output"),
            log_destination: LogDestination::File,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientSettings::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Layers defaults, the RON file, environment variables and flags, in that order.
pub fn load(cli: &Cli) -> Result<AppConfig, ConfigError> {
    load_with_env(cli, |key| std::env::var(key).ok())
}

fn load_with_env(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_file(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                read_file(path)?
            } else {
                AppConfig::default()
            }
        }
    };

    if let Some(v) = env("ROSTER_SERVER_URL") {
        config.server_url = v;
    }
    if let Some(v) = env("ROSTER_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(v);
    }

    if let Some(v) = &cli.server {
        config.server_url = v.clone();
    }
    if let Some(v) = &cli.output_dir {
        config.output_dir = v.clone();
    }
    if let Some(v) = cli.log {
        config.log_destination = v;
    }
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
