// src/source/source_error.rs

/// Raised while turning the Airbnb export into records. Any of these rejects
/// the whole snapshot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No data received from Airbnb")]
    Empty,
    #[error("Malformed CSV near line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("Line {line} has no value for '{field}'")]
    MissingField { line: u64, field: &'static str },
    #[error("Reservation {code}: '{value}' is not a valid date for '{field}'")]
    InvalidDate {
        code: String,
        field: &'static str,
        value: String,
    },
    #[error("Reservation {code}: '{value}' is not a whole number for '{field}'")]
    InvalidNumber {
        code: String,
        field: &'static str,
        value: String,
    },
    #[error("Reservation {code}: end date is before start date")]
    DateOrder { code: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Status code: {status} ({body})")]
    Status { status: u16, body: String },
    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },
}
