use std::io;

use thiserror::Error;

use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;
use crate::service::ServiceError;
use crate::store::StoreError;

use super::cli::ConfigError;

/// Failures between parsing arguments and finishing the run
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{message}")]
    Config { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Input {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot open analytics store: {0}")]
    Store(#[from] StoreError),

    #[error("Report query failed: {0}")]
    Report(#[from] ServiceError),

    #[error("Cannot write report: {0}")]
    Output(#[from] io::Error),
}

impl From<ConfigError> for StartupError {
    fn from(error: ConfigError) -> Self {
        StartupError::Config {
            message: error.to_string(),
        }
    }
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Config { .. }
            | StartupError::Validation(_)
            | StartupError::Input { .. } => true,
            StartupError::Store(e) => e.is_user_actionable(),
            StartupError::Report(_) | StartupError::Output(_) => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Config { message } | StartupError::Input { message, .. } => Some(message),
            StartupError::Validation(e) => Some(e.details()),
            StartupError::Store(e) => e.user_message(),
            StartupError::Report(_) | StartupError::Output(_) => None,
        }
    }
}
