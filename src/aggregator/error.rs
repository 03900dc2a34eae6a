//! Aggregation error types

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Lock for user '{user_id}' is poisoned: {message}")]
    Poisoned { user_id: String, message: String },

    #[error("Running total for user '{user_id}' overflowed")]
    Overflow { user_id: String },
}

pub type AggregateResult<T> = Result<T, AggregateError>;
