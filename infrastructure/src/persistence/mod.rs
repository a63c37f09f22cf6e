//! Durable run storage

mod sqlite;

pub use sqlite::SqliteRunRepository;
