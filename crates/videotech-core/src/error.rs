//! Error types for the video technology adapter
//!
//! Only construction-time misuse is reported through [`Error`]. Backend
//! failures during playback become canonical `ERROR` notifications and
//! operations on destroyed sessions are absorbed as no-ops.

use crate::event::EventKind;
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
#[derive(Error, Debug)]
pub enum Error {
    // Factory errors
    #[error("Unsupported stream encoding '{encoding}' for technology {technology}")]
    UnsupportedEncoding { technology: String, encoding: String },

    #[error("Technology {0} has been retired")]
    FactoryRetired(String),

    #[error("Session already active: {0}")]
    DuplicateSession(String),

    #[error("Backend construction failed: {0}")]
    Backend(String),

    // Registry errors
    #[error("Technology already registered: {0}")]
    DuplicateTechnology(String),

    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),

    // Translation table errors
    #[error("Translation table does not cover {missing:?}")]
    IncompleteTranslation { missing: Vec<EventKind> },

    #[error("Native event '{0}' is bound more than once")]
    DuplicateBinding(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid stream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a backend construction error
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    /// Returns true if the host may retry with another technology
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedEncoding { .. }
                | Error::FactoryRetired(_)
                | Error::Backend(_)
                | Error::UnknownTechnology(_)
        )
    }

    /// Returns the error code reported to hosts
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnsupportedEncoding { .. } => "UNSUPPORTED_ENCODING",
            Error::FactoryRetired(_) => "FACTORY_RETIRED",
            Error::DuplicateSession(_) => "DUPLICATE_SESSION",
            Error::Backend(_) => "BACKEND",
            Error::DuplicateTechnology(_) => "DUPLICATE_TECHNOLOGY",
            Error::UnknownTechnology(_) => "UNKNOWN_TECHNOLOGY",
            Error::IncompleteTranslation { .. } => "INCOMPLETE_TRANSLATION",
            Error::DuplicateBinding(_) => "DUPLICATE_BINDING",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Json(_) => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::UnsupportedEncoding {
            technology: "html5".into(),
            encoding: "mpd".into(),
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_ENCODING");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Unsupported stream encoding 'mpd' for technology html5"
        );

        let err = Error::IncompleteTranslation {
            missing: vec![EventKind::Buffered],
        };
        assert_eq!(err.error_code(), "INCOMPLETE_TRANSLATION");
        assert!(!err.is_recoverable());
    }
}
