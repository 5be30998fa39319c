//! Error types for the voting core

use sealvote_cipher::CipherError;
use thiserror::Error;

use crate::identity::VoterId;
use crate::proposal::{ProposalId, ProposalState};

/// Result type for voting core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors returned by the voting core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed caller input (empty title, oversized description, bad hex)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Proposal not found: {0}")]
    NotFound(ProposalId),

    #[error("Proposal {id} is not open (state: {state})")]
    NotOpen { id: ProposalId, state: ProposalState },

    #[error("Proposal {id} is not closed (state: {state})")]
    NotClosed { id: ProposalId, state: ProposalState },

    #[error("Voter {voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: VoterId },

    #[error("Proposal {0} already revealed")]
    AlreadyRevealed(ProposalId),

    /// Ledger and tally disagree. Integrity fault, never retried.
    #[error("Tally mismatch on proposal {id} ({ballots} ballots): {detail}")]
    TallyMismatch {
        id: ProposalId,
        ballots: u64,
        detail: String,
    },

    /// Decryption capability does not belong to the evaluation key
    #[error("Decryption capability not authorized for proposal {0}")]
    Unauthorized(ProposalId),

    #[error("Ballot limit of {limit} reached on proposal {id}")]
    BallotLimitReached { id: ProposalId, limit: u64 },

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Durable journal rejected the transition; nothing was applied
    #[error("Journal error: {0}")]
    Journal(String),
}

impl CoreError {
    /// Integrity faults that must halt the caller
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::TallyMismatch { .. })
    }

    /// Errors the caller can act on (fix input, recheck state, inform voter)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidInput(_)
                | CoreError::NotFound(_)
                | CoreError::NotOpen { .. }
                | CoreError::NotClosed { .. }
                | CoreError::AlreadyVoted { .. }
                | CoreError::AlreadyRevealed(_)
                | CoreError::Unauthorized(_)
                | CoreError::BallotLimitReached { .. }
        )
    }
}
