//! Tally Engine - encrypted yes/no sums
//!
//! Each accepted ballot `Enc(c)` with `c ∈ {0, 1}` is folded as
//! `yes += Enc(c)` and `no += Enc(1 - c)`. The engine never decrypts and never
//! branches on a vote value; the boolean domain is trusted to the scheme.
//!
//! Tallies are immutable values: a fold returns a new tally, which the
//! caller publishes in one pointer swap.

use serde::{Deserialize, Serialize};
use sealvote_cipher::HomomorphicOps;

use crate::errors::CoreResult;
use crate::proposal::ProposalId;

/// Encrypted running sums for one proposal
#[derive(Clone, Debug)]
pub struct EncryptedTally<C> {
    yes: C,
    no: C,
    /// Number of ballots folded (public, equals the ledger size)
    ballots: u64,
}

impl<C: HomomorphicOps> EncryptedTally<C> {
    /// Empty tally: `(Enc(0), Enc(0))`
    pub fn new(key: &C::EvalKey) -> CoreResult<Self> {
        Ok(Self {
            yes: C::encrypted_zero(key)?,
            no: C::encrypted_zero(key)?,
            ballots: 0,
        })
    }

    /// Fold one encrypted 0/1 choice into a new tally
    pub fn fold_ballot(&self, choice: &C, key: &C::EvalKey) -> CoreResult<Self> {
        let yes = self.yes.add(choice, key)?;
        let no = self.no.add(&choice.complement(key)?, key)?;

        Ok(Self {
            yes,
            no,
            ballots: self.ballots + 1,
        })
    }

    /// Encrypted `yes` sum
    pub fn yes_sum(&self) -> &C {
        &self.yes
    }

    /// Encrypted `no` sum
    pub fn no_sum(&self) -> &C {
        &self.no
    }

    /// Both sums, cloned
    pub fn sums(&self) -> (C, C) {
        (self.yes.clone(), self.no.clone())
    }

    pub fn ballots(&self) -> u64 {
        self.ballots
    }

    /// Serialized form for the journal
    pub fn encode(&self) -> CoreResult<TallyRecord> {
        Ok(TallyRecord {
            yes: self.yes.to_bytes()?,
            no: self.no.to_bytes()?,
            ballots: self.ballots,
        })
    }

    /// Rebuild from a journal record
    pub fn decode(record: &TallyRecord) -> CoreResult<Self> {
        Ok(Self {
            yes: C::from_bytes(&record.yes)?,
            no: C::from_bytes(&record.no)?,
            ballots: record.ballots,
        })
    }

    /// Display form with truncated ciphertexts
    pub fn view(&self, proposal: ProposalId) -> CoreResult<TallyView> {
        Ok(TallyView {
            proposal,
            yes: self.yes.preview()?,
            no: self.no.preview()?,
            ballots: self.ballots,
        })
    }
}

/// Serialized tally as written to durable storage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRecord {
    pub yes: Vec<u8>,
    pub no: Vec<u8>,
    pub ballots: u64,
}

/// Encrypted tally rendered for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyView {
    pub proposal: ProposalId,
    /// Truncated hex of the encrypted yes sum
    pub yes: String,
    /// Truncated hex of the encrypted no sum
    pub no: String,
    pub ballots: u64,
}
