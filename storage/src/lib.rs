//! SEALVOTE Storage Layer
//!
//! Durable journal for the voting core, backed by redb.
//!
//! # Tables
//!
//! - `proposals`: proposal records by id
//! - `ledger`: `(proposal id, voter)` membership, one row per accepted ballot
//! - `tallies`: serialized encrypted sums by proposal id
//! - `disclosures`: published results by proposal id
//!
//! Each journal callback commits in a single write transaction, so a ledger
//! row never exists without the tally that counts it.

mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{BallotStore, StorageStats};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path
    pub path: PathBuf,
    /// fsync every commit. When false, commits are durable only after a
    /// later durable commit or a clean shutdown.
    pub durable_commits: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./sealvote_data/ballots.redb"),
            durable_commits: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert!(config.durable_commits);
        assert_eq!(config.path.extension().unwrap(), "redb");
    }
}
