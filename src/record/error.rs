//! Record decoding errors

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("line is not valid UTF-8: {source}")]
    Encoding {
        #[from]
        source: std::str::Utf8Error,
    },

    #[error("malformed record: {source}")]
    Malformed {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ParseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ParseError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
