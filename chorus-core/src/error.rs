//! Error types for the chorus crates.
//!
//! Malformed model output is never an error; see `transcript::LineOutcome`. [`ChorusError`]
//! covers bus failures, configuration and cancellation.

use thiserror::Error;

/// Top-level error (bus transport, config, cancellation).
#[derive(Error, Debug)]
pub enum ChorusError {
    #[error("Bus error: {0}")]
    Bus(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ChorusError>,
    },
}

impl ChorusError {
    /// Wraps the error with a short description of the step that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        ChorusError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True if this error, or any error it wraps, is [`ChorusError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        match self {
            ChorusError::Cancelled => true,
            ChorusError::Context { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type for core operations; uses [`ChorusError`].
pub type Result<T> = std::result::Result<T, ChorusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_message() {
        let err = ChorusError::Cancelled.context("process line");
        assert_eq!(err.to_string(), "process line: Cancelled");
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_is_cancelled_false_for_other_errors() {
        let err = ChorusError::Bus("topic closed".to_string()).context("publish");
        assert!(!err.is_cancelled());
        assert!(!ChorusError::Config("bad".to_string()).is_cancelled());
    }
}
