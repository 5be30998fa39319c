//! Durability seam
//!
//! Every state transition is handed to a [`VoteJournal`] while the proposal's
//! critical section is held, before the change becomes visible in memory. If
//! the journal fails, the transition is abandoned.

use serde::{Deserialize, Serialize};

use crate::disclosure::DisclosureRecord;
use crate::errors::CoreResult;
use crate::identity::VoterId;
use crate::proposal::{Proposal, ProposalId};
use crate::tally::TallyRecord;

/// Sink for committed state transitions
pub trait VoteJournal: Send + Sync {
    /// A new proposal and its empty tally
    fn proposal_created(&self, proposal: &Proposal, tally: &TallyRecord) -> CoreResult<()>;

    /// A ledger entry and the tally that includes its ballot, as one write
    fn ballot_accepted(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        tally: &TallyRecord,
    ) -> CoreResult<()>;

    /// A lifecycle transition without a disclosure (close)
    fn proposal_updated(&self, proposal: &Proposal) -> CoreResult<()>;

    /// The disclosure record and the `Revealed` proposal, as one write
    fn disclosed(&self, proposal: &Proposal, record: &DisclosureRecord) -> CoreResult<()>;
}

/// Journal that keeps nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NullJournal;

impl VoteJournal for NullJournal {
    fn proposal_created(&self, _proposal: &Proposal, _tally: &TallyRecord) -> CoreResult<()> {
        Ok(())
    }

    fn ballot_accepted(
        &self,
        _proposal: ProposalId,
        _voter: &VoterId,
        _tally: &TallyRecord,
    ) -> CoreResult<()> {
        Ok(())
    }

    fn proposal_updated(&self, _proposal: &Proposal) -> CoreResult<()> {
        Ok(())
    }

    fn disclosed(&self, _proposal: &Proposal, _record: &DisclosureRecord) -> CoreResult<()> {
        Ok(())
    }
}

/// Persisted state of one proposal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    pub proposal: Proposal,
    pub voters: Vec<VoterId>,
    pub tally: TallyRecord,
    pub disclosure: Option<DisclosureRecord>,
}

/// Persisted state of the whole core
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoreSnapshot {
    pub proposals: Vec<ProposalSnapshot>,
}
