//! Core CLI arguments structure
//!
//! This module contains the Args struct definition and basic accessors.
//! Validation and configuration loading live in sibling modules.

use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::core::validation::validate_positive_int;

pub const DEFAULT_DB_PATH: &str = "orderstats.db";

/// Command-line options
///
/// Every setting except `--file` can also come from the TOML configuration
/// file; options given on the command line win.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "orderstats")]
#[command(about = "Ingest e-commerce order records into per-user analytics")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Input file of newline-delimited JSON orders ('-' reads stdin)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of concurrent workers [default: 10]
    #[arg(short = 'w', long = "workers", value_name = "N", value_parser = validate_positive_int)]
    pub workers: Option<usize>,

    /// Records per committed batch [default: 500]
    #[arg(short = 'b', long = "batch", value_name = "N", value_parser = validate_positive_int)]
    pub batch_size: Option<usize>,

    /// Maximum lines buffered between reader and workers [default: 10000]
    #[arg(long = "queue-capacity", value_name = "N", value_parser = validate_positive_int)]
    pub queue_capacity: Option<usize>,

    /// SQLite database path [default: orderstats.db]
    #[arg(short = 'd', long = "db-path", value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// After ingesting, list the N users with the most orders
    #[arg(long = "top", value_name = "N", value_parser = validate_positive_int)]
    pub top: Option<usize>,

    /// After ingesting, list users with anomalous order counts or spend
    #[arg(long = "anomalies")]
    pub anomalies: bool,

    /// Colour preference from the configuration file
    #[arg(skip)]
    pub config_color: Option<bool>,

    #[arg(skip)]
    pub cache_enabled: Option<bool>,

    #[arg(skip)]
    pub cache_ttl_secs: Option<u64>,

    #[arg(skip)]
    pub busy_timeout_ms: Option<u64>,

    #[arg(skip)]
    pub max_idle_connections: Option<usize>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit colour choice: CLI flags first, then the configuration file
    pub fn color_choice(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            self.config_color
        }
    }

    /// Whether to colour output, falling back to "is stdout a terminal"
    pub fn use_color(&self) -> bool {
        self.color_choice()
            .unwrap_or_else(|| std::io::stdout().is_terminal())
    }

    /// Layer command-line values over these (configuration file) values
    pub fn override_with(self, cli: &Args) -> Args {
        Args {
            file: cli.file.clone().or(self.file),
            workers: cli.workers.or(self.workers),
            batch_size: cli.batch_size.or(self.batch_size),
            queue_capacity: cli.queue_capacity.or(self.queue_capacity),
            db_path: cli.db_path.clone().or(self.db_path),
            config_file: cli.config_file.clone().or(self.config_file),
            log_level: cli.log_level.clone().or(self.log_level),
            log_format: cli.log_format.clone().or(self.log_format),
            log_file: cli.log_file.clone().or(self.log_file),
            color: cli.color,
            no_color: cli.no_color,
            top: cli.top.or(self.top),
            anomalies: cli.anomalies || self.anomalies,
            config_color: cli.config_color.or(self.config_color),
            cache_enabled: cli.cache_enabled.or(self.cache_enabled),
            cache_ttl_secs: cli.cache_ttl_secs.or(self.cache_ttl_secs),
            busy_timeout_ms: cli.busy_timeout_ms.or(self.busy_timeout_ms),
            max_idle_connections: cli.max_idle_connections.or(self.max_idle_connections),
        }
    }
}
