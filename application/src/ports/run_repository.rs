//! Durable run storage port

use council_domain::{RequestState, RunSummary};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored run {request_id} is unreadable: {reason}")]
    Corrupt { request_id: String, reason: String },
}

/// Durable storage of whole run states
///
/// One record per request id holding the full state; `save` overwrites.
/// Calls are short and synchronous; callers never hold a cache lock
/// across them.
pub trait RunRepository: Send + Sync {
    fn save(&self, state: &RequestState) -> Result<(), RepositoryError>;

    fn load(&self, request_id: &str) -> Result<Option<RequestState>, RepositoryError>;

    /// Most recent runs first
    fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RepositoryError>;

    /// Deleting an unknown id is not an error
    fn delete(&self, request_id: &str) -> Result<(), RepositoryError>;
}
