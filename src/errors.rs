//! Error types for memoduet
//!
//! Budget exhaustion and the iteration cap are terminal dialogue states,
//! not errors; see [`crate::dialogue::DialogueState`].

use std::fmt;
use thiserror::Error;

/// Which finalization call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizationStage {
    /// Closing summary request to Alfred
    Summary,

    /// Title generation from the summary
    Title,
}

impl fmt::Display for FinalizationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalizationStage::Summary => write!(f, "summary"),
            FinalizationStage::Title => write!(f, "title"),
        }
    }
}

/// Main error type for the dialogue pipeline
#[derive(Error, Debug)]
pub enum DialogueError {
    /// State machine transition errors
    #[error("Invalid state transition from {from:?} to {to:?}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Completion service failures (provider or network)
    #[error("Completion service error: {0}")]
    Completion(String),

    /// Summary or title generation failed after the dialogue ended
    #[error("Finalization failed during {stage} generation: {message}")]
    Finalization {
        stage: FinalizationStage,
        message: String,
    },

    /// Idea/instruction extraction errors
    #[error("Intake error: {0}")]
    Intake(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cooperative cancellation observed outside the turn loop
    #[error("Operation cancelled")]
    Cancelled,

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Dialogue error: {0}")]
    Generic(String),
}

impl DialogueError {
    /// True when the failure happened while producing the closing artifact
    pub fn is_finalization(&self) -> bool {
        matches!(self, DialogueError::Finalization { .. })
    }
}

/// Result type alias for dialogue operations
pub type Result<T> = std::result::Result<T, DialogueError>;

/// Convert anyhow errors to DialogueError
impl From<anyhow::Error> for DialogueError {
    fn from(err: anyhow::Error) -> Self {
        DialogueError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalization_error_names_stage() {
        let err = DialogueError::Finalization {
            stage: FinalizationStage::Title,
            message: "HTTP 500".to_string(),
        };
        assert!(err.to_string().contains("title"));
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.is_finalization());
    }

    #[test]
    fn test_completion_error_is_not_finalization() {
        let err = DialogueError::Completion("connection reset".to_string());
        assert!(!err.is_finalization());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = DialogueError::InvalidTransition {
            from: "StoppedBySignal".to_string(),
            to: "(via TurnCompleted)".to_string(),
            reason: "Dialogue already finished".to_string(),
        };
        assert!(err.to_string().contains("StoppedBySignal"));
    }
}
