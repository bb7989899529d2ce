//! Unified error hierarchy for cpfit
//!
//! Every precondition violation in the core surfaces as `InvalidInput` with a
//! message naming the violated condition. A fit over a singular design matrix
//! gets its own variant so callers can tell "your test durations must differ"
//! apart from malformed numbers.

use thiserror::Error;

/// Top-level error type for all cpfit operations
#[derive(Debug, Error)]
pub enum CpFitError {
    /// A precondition on fit or depletion inputs was violated
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The design matrix is singular (all durations identical)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// IO errors (config file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cpfit operations
pub type Result<T> = std::result::Result<T, CpFitError>;

impl CpFitError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CpFitError::InvalidInput(_) => ErrorSeverity::Warning,
            CpFitError::DegenerateInput(_) => ErrorSeverity::Warning,
            CpFitError::Configuration(_) => ErrorSeverity::Error,
            CpFitError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CpFitError::DegenerateInput(_) => {
                "Test durations must differ for the fit to be well-posed.".to_string()
            }
            CpFitError::Configuration(reason) => {
                format!("Configuration problem: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
