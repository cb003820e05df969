use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    /// Raised by `LedgerReader` implementations backed by real storage; the
    /// engine passes it through untouched.
    #[error("Ledger read failed: {0}")]
    Ledger(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EntitlementError {
    fn from(e: serde_json::Error) -> Self {
        EntitlementError::SerializationError(e.to_string())
    }
}
