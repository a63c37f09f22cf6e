//! Backend identity value object

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of a member or chairman backend (Value Object)
///
/// The identity is the service's base URL with trailing slashes stripped,
/// so `http://a:8001/` and `http://a:8001` name the same backend.
/// Ordering is plain byte-wise string ordering, which the anonymizer
/// relies on for deterministic label assignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendId(String);

impl BackendId {
    /// Parse and normalize a backend base URL
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(DomainError::InvalidBackend {
                url: raw.to_string(),
                reason: "URL is empty".to_string(),
            });
        }

        let rest = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| DomainError::InvalidBackend {
                url: raw.to_string(),
                reason: "scheme must be http or https".to_string(),
            })?;

        if rest.is_empty() || rest.starts_with('/') {
            return Err(DomainError::InvalidBackend {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the normalized base URL
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the full URL of an endpoint on this backend
    ///
    /// ```
    /// use council_domain::BackendId;
    ///
    /// let backend = BackendId::parse("http://localhost:8001/").unwrap();
    /// assert_eq!(backend.endpoint("/health"), "http://localhost:8001/health");
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BackendId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BackendId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BackendId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
