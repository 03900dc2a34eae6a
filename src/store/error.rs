//! Storage error types

use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open database '{path}': {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to provision schema: {source}")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },

    #[error("Batch commit for {users} user(s) rolled back: {source}")]
    Commit {
        users: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query '{operation}' failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Batch commit abandoned: shutdown requested")]
    Cancelled,

    #[error("Connection pool error: {message}")]
    Pool { message: String },

    #[error("Blocking database task failed: {message}")]
    Task { message: String },
}

impl StoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            message: message.into(),
        }
    }
}

impl ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, StoreError::InvalidArgument { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::InvalidArgument { message } => Some(message),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
