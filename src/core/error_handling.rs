//! Generic error handling utilities
//!
//! Provides unified fatal-error logging across the domain error types while
//! keeping the distinction between errors the user can fix (bad flags, bad
//! configuration) and system failures (storage, I/O).

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; when it returns `false`, `user_message()` returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown verbatim
    ///
    /// User-actionable: argument validation, configuration errors, missing input.
    /// System: storage connection failures, commit failures, I/O.
    fn is_user_actionable(&self) -> bool;

    /// The specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors log their own message at error level. System errors
/// log the operation context at error level and the details at debug level.
///
/// # Examples
/// ```rust,no_run
/// # use orderstats::core::error_handling::log_error_with_context;
/// # use orderstats::core::validation::ValidationError;
/// let err = ValidationError::new("workers must be greater than 0");
/// log_error_with_context(&err, "Validating arguments");
/// // Logs: "FATAL: workers must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}: {}", operation_context, error),
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
