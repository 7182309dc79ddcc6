//! Command-line interface parsing for the festival organizer
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`StartupConfig`].

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::data::backoff::BackoffError;
use crate::data::festivals::{festivals_url, DEFAULT_REST_URI};
use crate::data::BackoffConfig;
use crate::output::DEFAULT_OUTPUT_FILE;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The festivals API URI cannot be used
    #[error("Invalid REST URI: '{0}'")]
    InvalidRestUri(String),

    /// The backoff settings are inconsistent
    #[error("Invalid backoff settings: {0}")]
    InvalidBackoff(#[from] BackoffError),

    /// The request timeout is zero
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Festival organizer - list festivals grouped by record label and band
#[derive(Parser, Debug)]
#[command(name = "festival-organizer")]
#[command(about = "Regroups music festival data by record label and band")]
#[command(version)]
pub struct Cli {
    /// Base URI of the festivals API
    #[arg(long, env = "FESTIVALS_REST_URI", default_value = DEFAULT_REST_URI)]
    pub rest_uri: String,

    /// File the restructured listing is written to
    #[arg(short, long, env = "FESTIVALS_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Whether to fetch and write the listing at startup
    #[arg(
        long,
        env = "FESTIVALS_LIST_ON_START",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_name = "BOOL"
    )]
    pub list_on_start: bool,

    /// Wait before the first retry of a failed request, in milliseconds
    #[arg(long, env = "FESTIVALS_BACKOFF_INITIAL_MS", default_value_t = 2000, value_name = "MS")]
    pub backoff_initial_ms: u64,

    /// Growth factor between consecutive retry waits
    #[arg(
        long,
        env = "FESTIVALS_BACKOFF_MULTIPLIER",
        default_value_t = 1.5,
        value_name = "FACTOR"
    )]
    pub backoff_multiplier: f64,

    /// Longest single retry wait, in milliseconds
    #[arg(
        long,
        env = "FESTIVALS_BACKOFF_MAX_INTERVAL_MS",
        default_value_t = 30_000,
        value_name = "MS"
    )]
    pub backoff_max_interval_ms: u64,

    /// Total retry waiting time after which the last response is used, in milliseconds
    #[arg(
        long,
        env = "FESTIVALS_BACKOFF_MAX_ELAPSED_MS",
        default_value_t = 120_000,
        value_name = "MS"
    )]
    pub backoff_max_elapsed_ms: u64,

    /// Timeout for a single HTTP request, in seconds
    #[arg(long, env = "FESTIVALS_TIMEOUT_SECS", default_value_t = 30, value_name = "SECS")]
    pub timeout_secs: u64,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Base URI of the festivals API
    pub rest_uri: String,
    /// Where the listing is written
    pub output: PathBuf,
    /// Whether the listing is produced at startup
    pub list_on_start: bool,
    /// Retry policy for throttled requests
    pub backoff: BackoffConfig,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            rest_uri: DEFAULT_REST_URI.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            list_on_start: true,
            backoff: BackoffConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the URI, backoff or timeout settings are unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        festivals_url(&cli.rest_uri).map_err(|_| CliError::InvalidRestUri(cli.rest_uri.clone()))?;

        let backoff = BackoffConfig {
            initial_interval: Duration::from_millis(cli.backoff_initial_ms),
            multiplier: cli.backoff_multiplier,
            max_interval: Duration::from_millis(cli.backoff_max_interval_ms),
            max_elapsed_time: Duration::from_millis(cli.backoff_max_elapsed_ms),
            max_attempts: None,
        };
        backoff.validate()?;

        if cli.timeout_secs == 0 {
            return Err(CliError::ZeroTimeout);
        }

        Ok(StartupConfig {
            rest_uri: cli.rest_uri.clone(),
            output: cli.output.clone(),
            list_on_start: cli.list_on_start,
            backoff,
            request_timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
