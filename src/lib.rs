//! SEALVOTE: confidential yes/no voting
//!
//! Root crate re-exporting the workspace components for integration tests
//! and embedding.
//!
//! ## Crate Organization
//!
//! - `sealvote-cipher`: additively homomorphic ballot ciphertexts
//! - `sealvote-core`: proposal registry, vote ledger, tally engine, disclosure
//! - `sealvote-storage`: redb-backed journal and recovery

pub use sealvote_cipher as cipher;
pub use sealvote_core as voting;
pub use sealvote_storage as storage;

/// SEALVOTE version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use sealvote_cipher::{
        Decrypt, ElGamalCiphertext, HomomorphicOps, KeyPair, PublicKey, SecretKey,
    };
    pub use sealvote_core::{
        CoreConfig, CoreError, CoreResult, DisclosureRecord, Identity, Outcome, Proposal,
        ProposalId, ProposalState, VoterId, VotingCore,
    };
    pub use sealvote_storage::{BallotStore, StorageConfig};
}
