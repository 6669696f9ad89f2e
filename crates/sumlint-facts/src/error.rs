//! Error types for fact store operations

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FactError>;

/// Failures of a fact store backend. The in-memory store never fails.
#[derive(Debug, Error)]
pub enum FactError {
    #[error("fact store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("cannot encode or decode fact: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("fact database: {0}")]
    Database(#[from] redb::Error),

    #[error("cannot open fact database: {0}")]
    DatabaseCreation(#[from] redb::DatabaseError),

    #[error("fact database transaction: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("cannot commit facts: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("fact table: {0}")]
    Table(#[from] redb::TableError),

    #[error("fact database storage: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("fact stored under {key} describes {found}")]
    KeyMismatch { key: String, found: String },
}
