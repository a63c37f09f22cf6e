//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No council members configured")]
    NoMembers,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBackend { url: String, reason: String },
}

impl DomainError {
    /// Check if this error was caused by caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidQuery(_) | DomainError::InvalidBackend { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_backend_display() {
        let error = DomainError::InvalidBackend {
            url: "ftp://x".to_string(),
            reason: "unsupported scheme".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid backend URL 'ftp://x': unsupported scheme"
        );
    }

    #[test]
    fn test_is_validation_check() {
        assert!(DomainError::InvalidQuery("empty".to_string()).is_validation());
        assert!(!DomainError::NoMembers.is_validation());
    }
}
