//! Custom error types for get-papers-list.
//!
//! Every failure the pipeline can hit is one of these variants. None of them
//! are retried: they propagate unchanged to the binary, which reports them
//! and exits non-zero.

use thiserror::Error;

/// Main error type for paper fetching and export.
#[derive(Debug, Error)]
pub enum PapersError {
    /// The network call itself could not complete (DNS, refused, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Failed to fetch data: HTTP {status}")]
    Fetch {
        /// Status code received from the endpoint
        status: u16,
    },

    /// A payload was received but could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Export requested with zero records
    #[error("No papers to save")]
    EmptyResult,

    /// Query or id list rejected before any request was made
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// CSV file whose header row is not the record schema
    #[error("Invalid export file: {0}")]
    InvalidExport(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization/deserialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using `PapersError`
pub type Result<T> = std::result::Result<T, PapersError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a malformed-response message
    fn ok_or_malformed(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PapersError::MalformedResponse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mentions_status() {
        let err = PapersError::Fetch { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_ok_or_malformed() {
        let missing: Option<u32> = None;
        match missing.ok_or_malformed("no root") {
            Err(PapersError::MalformedResponse(msg)) => assert_eq!(msg, "no root"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(Some(3).ok_or_malformed("unused").ok(), Some(3));
    }
}
