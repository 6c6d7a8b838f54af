use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarginCallError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Duplicate client id in roster: {0}")]
    DuplicateClient(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Row {row}: cannot parse field '{field}' from value '{raw}'")]
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for MarginCallError {
    fn from(e: std::io::Error) -> Self {
        MarginCallError::Io(e.to_string())
    }
}

impl From<csv::Error> for MarginCallError {
    fn from(e: csv::Error) -> Self {
        MarginCallError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for MarginCallError {
    fn from(e: serde_json::Error) -> Self {
        MarginCallError::SerializationError(e.to_string())
    }
}
