use std::io;

use thiserror::Error;

/// Errors surfaced by entailment scorers.
///
/// Callers treat every variant as recoverable: a failing scorer degrades
/// the evaluation to exact-only matching rather than aborting the run.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g., API mode without a URL).
    #[error("invalid scorer config: {0}")]
    InvalidConfig(String),
    /// Transport-level failure while calling the remote scorer.
    #[error("scorer request failed: {0}")]
    Http(String),
    /// The remote scorer answered, but not with what we asked for
    /// (wrong arity, missing fields, unparsable body).
    #[error("malformed scorer response: {0}")]
    BadResponse(String),
    /// Low-level IO failures.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = SemanticError::InvalidConfig("missing api_url".into());
        assert!(err.to_string().contains("missing api_url"));

        let err = SemanticError::BadResponse("expected 3 scores, got 1".into());
        assert!(err.to_string().contains("expected 3 scores"));
    }

    #[test]
    fn io_errors_convert() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "deadline");
        let err: SemanticError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
