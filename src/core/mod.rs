//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod styles; // centralized styling palette for CLI output
pub mod sync;
pub mod validation;
pub mod version;
