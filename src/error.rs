//! Error types
//!
//! The simulation itself never fails. Only loading/saving files and
//! validating tuning can.

/// Errors raised at the crate's I/O and configuration edges
#[derive(thiserror::Error, Debug)]
pub enum KiloError {
    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a tuning or high-score file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tuning values out of range
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, KiloError>;
