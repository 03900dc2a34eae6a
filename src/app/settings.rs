//! Resolved run settings
//!
//! [`Args`] keeps every value optional so configuration layers can be merged;
//! `Settings` is the final answer with defaults filled in.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::validation::ValidationError;
use crate::pipeline::PipelineConfig;
use crate::service::DEFAULT_CACHE_TTL;
use crate::store::StoreConfig;

use super::cli::args::{Args, DEFAULT_DB_PATH};

/// Path meaning "read orders from standard input"
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub db_path: PathBuf,
    pub pipeline: PipelineConfig,
    pub store: StoreConfig,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub color: bool,
    pub top: Option<usize>,
    pub anomalies: bool,
}

impl Settings {
    /// Validate merged arguments and fill in defaults
    pub fn from_args(args: &Args) -> Result<Self, ValidationError> {
        args.validate()?;

        let input = args
            .file
            .clone()
            .ok_or_else(|| ValidationError::new("An input file is required (-f/--file)"))?;

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            workers: args.workers.unwrap_or(defaults.workers),
            batch_size: args.batch_size.unwrap_or(defaults.batch_size),
            queue_capacity: args.queue_capacity.unwrap_or(defaults.queue_capacity),
        };

        let store_defaults = StoreConfig::default();
        let store = StoreConfig {
            busy_timeout: args
                .busy_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(store_defaults.busy_timeout),
            max_idle_connections: args
                .max_idle_connections
                .unwrap_or(store_defaults.max_idle_connections),
        };

        let log_file = args.log_file.clone().filter(|path| {
            let name = path.to_string_lossy();
            !(name.eq_ignore_ascii_case("none") || name == STDIN_PATH)
        });

        Ok(Self {
            input,
            db_path: args
                .db_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            pipeline,
            store,
            cache_enabled: args.cache_enabled.unwrap_or(false),
            cache_ttl: args
                .cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CACHE_TTL),
            log_level: args.log_level.clone(),
            log_format: args.log_format.clone(),
            log_file,
            color: args.use_color(),
            top: args.top,
            anomalies: args.anomalies,
        })
    }

    /// True when orders come from standard input
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIN_PATH
    }

    /// Whether any read-side report follows ingestion
    pub fn wants_reports(&self) -> bool {
        self.top.is_some() || self.anomalies
    }
}
