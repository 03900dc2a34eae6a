//! CLI module containing argument parsing, configuration and validation

pub mod args;
pub mod config;
mod validation;

pub use args::Args;
pub use config::{default_config_path, ConfigError};
