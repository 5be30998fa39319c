//! SEALVOTE Core
//!
//! Confidential yes/no voting: ballots arrive encrypted, are folded into
//! per-proposal encrypted sums, and only the final totals are ever decrypted.
//!
//! # Components
//!
//! - [`proposal`]: registry records and the `Open -> Closed -> Revealed` lifecycle
//! - [`ledger`]: one ballot per voter per proposal
//! - [`tally`]: encrypted yes/no running sums
//! - [`disclosure`]: gated, single-shot decryption of the final sums
//! - [`engine`]: [`VotingCore`], which ties them together under per-proposal locks
//! - [`journal`]: durability seam for committed transitions

pub mod config;
pub mod disclosure;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod journal;
pub mod ledger;
pub mod proposal;
pub mod tally;

pub use config::CoreConfig;
pub use disclosure::{DisclosureRecord, Outcome};
pub use engine::VotingCore;
pub use errors::{CoreError, CoreResult};
pub use identity::{Identity, VoterId};
pub use journal::{CoreSnapshot, NullJournal, ProposalSnapshot, VoteJournal};
pub use ledger::VoteLedger;
pub use proposal::{Proposal, ProposalId, ProposalState};
pub use tally::{EncryptedTally, TallyRecord, TallyView};

/// Current unix time in seconds
pub(crate) fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
