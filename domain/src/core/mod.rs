//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendId`]: normalized identity of a member or chairman service
//! - [`query::Query`]: a validated query to pose to the council
//! - [`error::DomainError`]: domain-level errors

pub mod backend;
pub mod error;
pub mod query;
