//! Repository Module
//!
//! Storage access on top of embedded SurrealDB. Every cross-request race in
//! the order lifecycle is resolved here with single conditional statements;
//! callers never read-then-write around a precondition.

pub mod address;
pub mod counter;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

// Re-exports
pub use address::AddressRepository;
pub use counter::DayCounterRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use store::StoreRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        // The embedded SDK reports unique index violations as plain database
        // errors; classify by message so callers can regenerate-and-retry.
        let msg = err.to_string();
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
