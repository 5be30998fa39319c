//! Disclosure Controller - the single point where totals become plaintext
//!
//! A proposal is disclosed at most once, only after it is closed, and only
//! if the decrypted sums account for exactly the ballots in the ledger.

use serde::{Deserialize, Serialize};
use sealvote_cipher::{CipherError, Decrypt, HomomorphicOps};

use crate::errors::{CoreError, CoreResult};
use crate::identity::Identity;
use crate::ledger::VoteLedger;
use crate::proposal::{Proposal, ProposalId, ProposalState};
use crate::tally::EncryptedTally;

/// Published result of a proposal. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    pub proposal: ProposalId,
    pub yes_count: u64,
    pub no_count: u64,
    pub revealer: Identity,
    /// Unix seconds
    pub revealed_at: u64,
}

/// Result of a disclosed vote
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Approved,
    Rejected,
    Tied,
}

impl DisclosureRecord {
    pub fn total(&self) -> u64 {
        self.yes_count + self.no_count
    }

    pub fn outcome(&self) -> Outcome {
        match self.yes_count.cmp(&self.no_count) {
            std::cmp::Ordering::Greater => Outcome::Approved,
            std::cmp::Ordering::Less => Outcome::Rejected,
            std::cmp::Ordering::Equal => Outcome::Tied,
        }
    }
}

/// Everything the controller inspects for one reveal
pub struct DisclosureRequest<'a, C: HomomorphicOps> {
    pub proposal: &'a Proposal,
    pub ledger: &'a VoteLedger,
    pub tally: &'a EncryptedTally<C>,
    pub existing: Option<&'a DisclosureRecord>,
    pub eval_key: &'a C::EvalKey,
}

/// Check preconditions, decrypt and verify. Does not mutate any state.
///
/// The caller must hold the proposal's critical section for the whole
/// reveal so no ballot lands between counting and recording.
pub fn disclose<C, D>(
    request: DisclosureRequest<'_, C>,
    capability: &D,
    revealer: Identity,
    now: u64,
) -> CoreResult<DisclosureRecord>
where
    C: HomomorphicOps,
    D: Decrypt<C> + ?Sized,
{
    let proposal = request.proposal;
    let id = proposal.id;

    if request.existing.is_some() || proposal.state == ProposalState::Revealed {
        return Err(CoreError::AlreadyRevealed(id));
    }
    if proposal.state != ProposalState::Closed {
        return Err(CoreError::NotClosed {
            id,
            state: proposal.state,
        });
    }
    if !capability.authorizes(request.eval_key) {
        return Err(CoreError::Unauthorized(id));
    }

    let ballots = request.ledger.len();
    if request.tally.ballots() != ballots {
        return Err(CoreError::TallyMismatch {
            id,
            ballots,
            detail: format!("tally folded {} ballots", request.tally.ballots()),
        });
    }

    let yes_count = decrypt_side(capability, request.tally.yes_sum(), id, ballots, "yes")?;
    let no_count = decrypt_side(capability, request.tally.no_sum(), id, ballots, "no")?;

    if yes_count + no_count != ballots {
        return Err(CoreError::TallyMismatch {
            id,
            ballots,
            detail: format!("yes {} + no {} != ballots", yes_count, no_count),
        });
    }

    Ok(DisclosureRecord {
        proposal: id,
        yes_count,
        no_count,
        revealer,
        revealed_at: now,
    })
}

fn decrypt_side<C, D>(
    capability: &D,
    sum: &C,
    id: ProposalId,
    ballots: u64,
    side: &str,
) -> CoreResult<u64>
where
    C: HomomorphicOps,
    D: Decrypt<C> + ?Sized,
{
    capability
        .decrypt_count(sum, ballots)
        .map_err(|e| match e {
            CipherError::OutOfRange { .. } => CoreError::TallyMismatch {
                id,
                ballots,
                detail: format!("{} sum exceeds ballot count", side),
            },
            other => CoreError::Cipher(other),
        })
}
