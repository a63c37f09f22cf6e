//! Query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A user query posed to the council (Value Object)
///
/// Immutable once a run has been created from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a new query, rejecting empty or whitespace-only text
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        Ok(Self { content })
    }

    /// Get the query text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Query::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("What is Rust?").unwrap();
        assert_eq!(q.content(), "What is Rust?");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(Query::new("").is_err());
        assert!(Query::new("  \n ").is_err());
    }

    #[test]
    fn test_query_keeps_surrounding_whitespace() {
        let q = Query::new("  spaced  ").unwrap();
        assert_eq!(q.content(), "  spaced  ");
    }
}
