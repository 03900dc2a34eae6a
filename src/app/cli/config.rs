//! TOML configuration file parsing and loading
//!
//! This module handles discovery of the default configuration file, reading
//! and parsing it, and mapping its keys onto [`Args`].

use std::path::{Path, PathBuf};

use crate::core::validation::{positive_from_toml, ValidationError};

use super::args::Args;

/// `<config dir>/Orderstats/orderstats.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Orderstats").join("orderstats.toml"))
}

/// Problems reading or parsing the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Error in configuration file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl Args {
    /// Load the configuration file into a fresh `Args`
    ///
    /// An explicitly named file must exist. Without one, the default location
    /// is used when a file is present there; otherwise defaults apply.
    pub async fn from_config_file(config_file: Option<&Path>) -> Result<Args, ConfigError> {
        let path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Args::default()),
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        let config = toml::from_str::<toml::Table>(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.clone(),
                source,
            }
        })?;

        let mut args = Args::default();
        Self::apply_toml_values(&mut args, &config)
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(args)
    }

    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(db_path) = config.get("db-path").and_then(|v| v.as_str()) {
            args.db_path = Some(PathBuf::from(db_path));
        }
        if let Some(workers) = Self::positive_field(config, "workers")? {
            args.workers = Some(workers);
        }
        if let Some(batch_size) = Self::positive_field(config, "batch-size")? {
            args.batch_size = Some(batch_size);
        }
        if let Some(capacity) = Self::positive_field(config, "queue-capacity")? {
            args.queue_capacity = Some(capacity);
        }
        if let Some(max_idle) = Self::positive_field(config, "max-idle-connections")? {
            args.max_idle_connections = Some(max_idle);
        }
        if let Some(ttl) = Self::positive_field(config, "cache-ttl-secs")? {
            args.cache_ttl_secs = Some(ttl as u64);
        }
        if let Some(timeout) = Self::positive_field(config, "busy-timeout-ms")? {
            args.busy_timeout_ms = Some(timeout as u64);
        }

        if let Some(enabled) = config.get("cache-enabled").and_then(|v| v.as_bool()) {
            args.cache_enabled = Some(enabled);
        }
        if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
            args.config_color = Some(color);
        }
        if let Some(log_level) = config.get("log-level").and_then(|v| v.as_str()) {
            args.log_level = Some(log_level.to_string());
        }
        if let Some(log_format) = config.get("log-format").and_then(|v| v.as_str()) {
            args.log_format = Some(log_format.to_string());
        }
        if let Some(log_file) = config.get("log-file").and_then(|v| v.as_str()) {
            if log_file.eq_ignore_ascii_case("none") || log_file == "-" {
                args.log_file = None; // "none" and "-" disable file logging
            } else {
                args.log_file = Some(PathBuf::from(log_file));
            }
        }

        Ok(())
    }

    /// Read an integer key that must be positive
    fn positive_field(config: &toml::Table, key: &str) -> Result<Option<usize>, ValidationError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => match value.as_integer() {
                Some(n) => positive_from_toml(key, n).map(Some),
                None => Err(ValidationError::new(&format!(
                    "'{}' in configuration must be an integer",
                    key
                ))),
            },
        }
    }
}
