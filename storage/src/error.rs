//! Storage errors

use sealvote_core::CoreError;
use thiserror::Error;

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store was written by an incompatible format version
    #[error("Unsupported store format: found {found}, expected {expected}")]
    UnsupportedFormat { found: u32, expected: u32 },

    /// Store is bound to a different evaluation key
    #[error("Store is bound to key {bound}, not {offered}")]
    KeyMismatch { bound: String, offered: String },

    /// Operation needs a store without proposals
    #[error("Store already holds {proposals} proposals")]
    NotEmpty { proposals: u64 },

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl From<bincode::Error> for StorageError {
    fn from(e: bincode::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

impl From<StorageError> for CoreError {
    fn from(e: StorageError) -> Self {
        CoreError::Journal(e.to_string())
    }
}
