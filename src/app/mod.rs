//! Application module: command line, settings and the run itself

pub mod cli;
pub mod error;
pub mod report;
pub mod settings;
pub mod startup;

pub use error::StartupError;
pub use settings::Settings;
