//! CLI Integration Test Modules
//!
//! Organized CLI integration tests split into focused modules.

pub mod argument_parsing;
pub mod run;
pub mod toml_config;
pub mod validation;
