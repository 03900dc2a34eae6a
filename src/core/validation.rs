//! Validation utilities for CLI arguments and configuration values

use crate::core::error_handling::ContextualError;
use std::fmt;

/// A user-actionable validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    details: String,
}

impl ValidationError {
    pub fn new(details: &str) -> Self {
        Self {
            details: details.to_string(),
        }
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl std::error::Error for ValidationError {}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.details)
    }
}

/// Validate a positive integer value given as text
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Ensure a named count is non-zero
pub fn require_positive(name: &str, value: usize) -> Result<usize, ValidationError> {
    if value == 0 {
        return Err(ValidationError::new(&format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(value)
}

/// Convert a TOML integer into a positive usize
pub fn positive_from_toml(name: &str, value: i64) -> Result<usize, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(&format!(
            "'{}' in configuration must be greater than 0 (got {})",
            name, value
        )));
    }
    usize::try_from(value).map_err(|_| {
        ValidationError::new(&format!(
            "'{}' in configuration is too large (got {})",
            name, value
        ))
    })
}
