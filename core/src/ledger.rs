//! Vote Ledger - one ballot per voter per proposal
//!
//! The ledger only remembers *that* a voter took part, never the ballot.
//! Membership is checked and inserted inside the proposal's critical section,
//! together with the tally fold.

use std::collections::HashSet;

use crate::errors::{CoreError, CoreResult};
use crate::identity::VoterId;
use crate::proposal::Proposal;

/// Set of voters who have cast a ballot on one proposal
#[derive(Clone, Debug, Default)]
pub struct VoteLedger {
    voters: HashSet<VoterId>,
}

impl VoteLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            voters: HashSet::new(),
        }
    }

    /// Rebuild a ledger from persisted entries.
    ///
    /// Returns an error if an entry is duplicated.
    pub fn from_voters(voters: impl IntoIterator<Item = VoterId>) -> CoreResult<Self> {
        let mut ledger = Self::new();
        for voter in voters {
            if !ledger.voters.insert(voter) {
                return Err(CoreError::InvalidInput(format!(
                    "Duplicate ledger entry for voter {}",
                    voter
                )));
            }
        }
        Ok(ledger)
    }

    /// Check that `voter` may vote on `proposal` without recording anything
    pub fn check(&self, proposal: &Proposal, voter: &VoterId) -> CoreResult<()> {
        if !proposal.is_open() {
            return Err(CoreError::NotOpen {
                id: proposal.id,
                state: proposal.state,
            });
        }
        if self.voters.contains(voter) {
            return Err(CoreError::AlreadyVoted {
                id: proposal.id,
                voter: *voter,
            });
        }
        Ok(())
    }

    /// Record that `voter` voted on `proposal`.
    ///
    /// Fails with `NotOpen` or `AlreadyVoted`; nothing is inserted on failure.
    pub fn record_vote(&mut self, proposal: &Proposal, voter: VoterId) -> CoreResult<()> {
        self.check(proposal, &voter)?;
        self.voters.insert(voter);
        Ok(())
    }

    /// Undo a `record_vote` whose transaction could not be committed
    pub(crate) fn rollback(&mut self, voter: &VoterId) {
        self.voters.remove(voter);
    }

    pub fn contains(&self, voter: &VoterId) -> bool {
        self.voters.contains(voter)
    }

    /// Number of recorded ballots
    pub fn len(&self) -> u64 {
        self.voters.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Voters in ascending byte order
    pub fn sorted_voters(&self) -> Vec<VoterId> {
        let mut voters: Vec<_> = self.voters.iter().copied().collect();
        voters.sort();
        voters
    }

    /// Order-independent digest of the ledger contents
    pub fn root_hash(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sealvote_ledger_root");
        for voter in self.sorted_voters() {
            hasher.update(voter.as_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}
