//! Request id generation port

/// Source of unique run identifiers
pub trait RequestIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}
