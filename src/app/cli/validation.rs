//! CLI argument validation utilities
//!
//! Checks the merged (configuration file + command line) arguments for values
//! clap cannot check on its own, since they may come from TOML.

use crate::core::logging::LogFormat;
use crate::core::validation::{require_positive, ValidationError};
use std::str::FromStr;

use super::args::Args;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl Args {
    /// Validate arguments for consistency and constraints
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_input()?;
        self.validate_sizes()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_input(&self) -> Result<(), ValidationError> {
        let Some(file) = &self.file else {
            return Err(ValidationError::new("An input file is required (-f/--file)"));
        };
        if file.as_os_str().is_empty() {
            return Err(ValidationError::new("Option --file cannot be empty"));
        }
        if let Some(db_path) = &self.db_path {
            if db_path.as_os_str().is_empty() {
                return Err(ValidationError::new("Option --db-path cannot be empty"));
            }
        }
        Ok(())
    }

    fn validate_sizes(&self) -> Result<(), ValidationError> {
        let counts = [
            ("workers", self.workers),
            ("batch size", self.batch_size),
            ("queue capacity", self.queue_capacity),
            ("max idle connections", self.max_idle_connections),
        ];
        for (name, value) in counts {
            if let Some(value) = value {
                require_positive(name, value)?;
            }
        }
        if self.cache_ttl_secs == Some(0) {
            return Err(ValidationError::new("cache TTL must be greater than 0"));
        }
        if self.busy_timeout_ms == Some(0) {
            return Err(ValidationError::new("busy timeout must be greater than 0"));
        }
        Ok(())
    }

    fn validate_logging(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ValidationError::new(&format!(
                    "Invalid log level '{}' (expected one of: {})",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }
        if let Some(format) = &self.log_format {
            if LogFormat::from_str(&format.to_ascii_lowercase()).is_err() {
                return Err(ValidationError::new(&format!(
                    "Invalid log format '{}' (expected text, ext or json)",
                    format
                )));
            }
        }
        Ok(())
    }
}
