//! Command-line interface parsing for hnfeed
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the configuration structs used by the client, the aggregator and the
//! output layer. All validation happens here, before any network activity.

use clap::Parser;
use std::time::Duration;
use thiserror::Error;

use crate::aggregate::{AggregatorConfig, MAX_TOP_ITEMS};
use crate::data::{ClientConfig, DEFAULT_BASE_URL};
use crate::page::PageRequest;

/// Largest page size accepted on the command line
pub const MAX_PAGE_SIZE: usize = MAX_TOP_ITEMS;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Page size outside the accepted range
    #[error("Invalid page size: {0}. Must be between 1 and {max}", max = MAX_PAGE_SIZE)]
    InvalidPageSize(usize),

    /// Story count outside the accepted range
    #[error("Invalid max items: {0}. Must be between 1 and {max}", max = MAX_TOP_ITEMS)]
    InvalidMaxItems(usize),

    /// Concurrency limit of zero
    #[error("Invalid max concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    /// Request timeout of zero
    #[error("Invalid timeout: {0}s. Must be at least 1 second")]
    InvalidTimeout(u64),

    /// Watch interval of zero
    #[error("Invalid watch interval: {0}s. Must be at least 1 second")]
    InvalidWatchInterval(u64),

    /// Base URL that is not an absolute http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// hnfeed - Cached, paginated Hacker News top stories
#[derive(Parser, Debug)]
#[command(name = "hnfeed")]
#[command(about = "Cached, paginated view of the Hacker News top stories")]
#[command(version)]
pub struct Cli {
    /// Zero-based page to show
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Number of stories per page
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Root of the Hacker News API
    #[arg(long, env = "HNFEED_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// How many top stories to resolve (1..=200)
    #[arg(long, default_value_t = MAX_TOP_ITEMS)]
    pub max_items: usize,

    /// Upper bound on simultaneous story fetches
    #[arg(long, default_value_t = MAX_TOP_ITEMS)]
    pub max_concurrency: usize,

    /// Do not cache an empty top stories list returned by a failing upstream
    #[arg(long)]
    pub no_cache_empty: bool,

    /// Keep running and re-render the page every SECONDS
    #[arg(long, value_name = "SECONDS")]
    pub watch: Option<u64>,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// How a page is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Numbered, human-readable listing
    #[default]
    Text,
    /// `{"items": [...], "totalCount": n}`
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Aggregation settings
    pub aggregator: AggregatorConfig,
    /// Page to render
    pub page: PageRequest,
    /// Output format
    pub output: OutputFormat,
    /// Refresh interval, if running in watch mode
    pub watch: Option<Duration>,
    /// Whether debug logging was requested
    pub verbose: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if any argument is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            return Err(CliError::InvalidPageSize(cli.page_size));
        }
        if cli.max_items == 0 || cli.max_items > MAX_TOP_ITEMS {
            return Err(CliError::InvalidMaxItems(cli.max_items));
        }
        if cli.max_concurrency == 0 {
            return Err(CliError::InvalidConcurrency(cli.max_concurrency));
        }
        if cli.timeout_secs == 0 {
            return Err(CliError::InvalidTimeout(cli.timeout_secs));
        }
        let watch = match cli.watch {
            Some(0) => return Err(CliError::InvalidWatchInterval(0)),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(StartupConfig {
            client: ClientConfig {
                base_url: parse_base_url(&cli.base_url)?,
                timeout: Duration::from_secs(cli.timeout_secs),
            },
            aggregator: AggregatorConfig {
                max_items: cli.max_items,
                max_concurrency: cli.max_concurrency,
                cache_empty_ids: !cli.no_cache_empty,
                ..AggregatorConfig::default()
            },
            page: PageRequest {
                page: cli.page,
                page_size: cli.page_size,
            },
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            watch,
            verbose: cli.verbose,
        })
    }
}

/// Validates a base URL argument, returning it without a trailing slash
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let url = reqwest::Url::parse(s).map_err(|_| CliError::InvalidBaseUrl(s.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(s.trim_end_matches('/').to_string()),
        _ => Err(CliError::InvalidBaseUrl(s.to_string())),
    }
}
