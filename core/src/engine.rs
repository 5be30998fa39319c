//! Voting core: proposal registry plus per-proposal critical sections
//!
//! Locking:
//! - `proposals` (RwLock): the id → cell map. Write-locked only to create.
//! - `ProposalCell::book` (Mutex): serializes ledger insert + fold, close and
//!   reveal for one proposal. Different proposals never contend.
//! - `ProposalCell::tally` (RwLock<Arc>): the published tally. Write-locked
//!   only for the pointer swap, so readers see a whole fold or none of it.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use sealvote_cipher::{Decrypt, HomomorphicOps};
use tracing::{debug, error, info, warn};

use crate::config::CoreConfig;
use crate::disclosure::{disclose, DisclosureRecord, DisclosureRequest};
use crate::errors::{CoreError, CoreResult};
use crate::identity::{Identity, VoterId};
use crate::journal::{CoreSnapshot, NullJournal, ProposalSnapshot, VoteJournal};
use crate::ledger::VoteLedger;
use crate::proposal::{Proposal, ProposalId, ProposalState};
use crate::tally::{EncryptedTally, TallyView};
use crate::unix_timestamp;

/// Mutable per-proposal state guarded by one mutex
struct ProposalBook {
    proposal: Proposal,
    ledger: VoteLedger,
    disclosure: Option<DisclosureRecord>,
}

struct ProposalCell<C> {
    book: Mutex<ProposalBook>,
    tally: RwLock<Arc<EncryptedTally<C>>>,
}

impl<C> ProposalCell<C> {
    fn new(book: ProposalBook, tally: EncryptedTally<C>) -> Self {
        Self {
            book: Mutex::new(book),
            tally: RwLock::new(Arc::new(tally)),
        }
    }

    fn published_tally(&self) -> Arc<EncryptedTally<C>> {
        self.tally.read().clone()
    }
}

struct Registry<C> {
    cells: BTreeMap<ProposalId, Arc<ProposalCell<C>>>,
    next_id: ProposalId,
}

/// The confidential voting state machine
pub struct VotingCore<C: HomomorphicOps> {
    eval_key: C::EvalKey,
    config: CoreConfig,
    journal: Arc<dyn VoteJournal>,
    registry: RwLock<Registry<C>>,
}

impl<C: HomomorphicOps> VotingCore<C> {
    /// Create an empty in-memory core with default limits
    pub fn new(eval_key: C::EvalKey) -> Self {
        Self {
            eval_key,
            config: CoreConfig::default(),
            journal: Arc::new(NullJournal),
            registry: RwLock::new(Registry {
                cells: BTreeMap::new(),
                next_id: ProposalId::new(0),
            }),
        }
    }

    /// Create an empty core with custom limits
    pub fn with_config(eval_key: C::EvalKey, config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let mut core = Self::new(eval_key);
        core.config = config;
        Ok(core)
    }

    /// Route committed transitions through `journal`
    pub fn with_journal(mut self, journal: Arc<dyn VoteJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Rebuild a core from persisted state.
    ///
    /// The snapshot is checked for internal consistency: unique ids, ledger
    /// size equal to the folded ballot count and within the ballot limit, and
    /// a disclosure record for the same proposal exactly when it is revealed.
    pub fn restore(
        eval_key: C::EvalKey,
        config: CoreConfig,
        snapshot: CoreSnapshot,
    ) -> CoreResult<Self> {
        let core = Self::with_config(eval_key, config)?;
        {
            let mut registry = core.registry.write();
            for entry in snapshot.proposals {
                let id = entry.proposal.id;
                if registry.cells.contains_key(&id) {
                    return Err(CoreError::InvalidInput(format!(
                        "Duplicate proposal {} in snapshot",
                        id
                    )));
                }

                let ledger = VoteLedger::from_voters(entry.voters)?;
                let limit = core.config.max_ballots_per_proposal;
                if ledger.len() > limit {
                    return Err(CoreError::BallotLimitReached { id, limit });
                }
                let tally = EncryptedTally::<C>::decode(&entry.tally)?;
                if tally.ballots() != ledger.len() {
                    return Err(CoreError::TallyMismatch {
                        id,
                        ballots: ledger.len(),
                        detail: format!("snapshot tally folded {} ballots", tally.ballots()),
                    });
                }

                let revealed = entry.proposal.state == ProposalState::Revealed;
                if revealed != entry.disclosure.is_some() {
                    return Err(CoreError::InvalidInput(format!(
                        "Proposal {} is {} but disclosure is {}",
                        id,
                        entry.proposal.state,
                        if entry.disclosure.is_some() { "present" } else { "missing" }
                    )));
                }

                if let Some(disclosure) = &entry.disclosure {
                    if disclosure.proposal != id {
                        return Err(CoreError::InvalidInput(format!(
                            "Proposal {} carries the disclosure of proposal {}",
                            id, disclosure.proposal
                        )));
                    }
                }

                if id >= registry.next_id {
                    registry.next_id = id.next().ok_or_else(|| {
                        CoreError::InvalidInput(format!(
                            "Proposal {} leaves no identifier for the next proposal",
                            id
                        ))
                    })?;
                }
                let book = ProposalBook {
                    proposal: entry.proposal,
                    ledger,
                    disclosure: entry.disclosure,
                };
                registry.cells.insert(id, Arc::new(ProposalCell::new(book, tally)));
            }
            info!("Restored {} proposals", registry.cells.len());
        }
        Ok(core)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn eval_key(&self) -> &C::EvalKey {
        &self.eval_key
    }

    fn cell(&self, id: ProposalId) -> CoreResult<Arc<ProposalCell<C>>> {
        self.registry
            .read()
            .cells
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound(id))
    }

    // ------------------------------------------------------------------
    // Proposal registry
    // ------------------------------------------------------------------

    /// Register a new open proposal
    pub fn create_proposal(&self, title: &str, description: &str) -> CoreResult<ProposalId> {
        let tally = EncryptedTally::<C>::new(&self.eval_key)?;
        let record = tally.encode()?;

        let mut registry = self.registry.write();
        let id = registry.next_id;
        if registry.cells.contains_key(&id) {
            return Err(CoreError::InvalidInput(format!("Proposal {} already exists", id)));
        }
        let next_id = id
            .next()
            .ok_or_else(|| CoreError::InvalidInput("Proposal id space exhausted".into()))?;
        let proposal = Proposal::new(id, title, description, &self.config, unix_timestamp())?;

        self.journal.proposal_created(&proposal, &record)?;

        info!("Created proposal {}: {}", id, proposal.title);
        let book = ProposalBook {
            proposal,
            ledger: VoteLedger::new(),
            disclosure: None,
        };
        registry.cells.insert(id, Arc::new(ProposalCell::new(book, tally)));
        registry.next_id = next_id;

        Ok(id)
    }

    /// `Open -> Closed`. Ballots racing this call are rejected with `NotOpen`.
    pub fn close_proposal(&self, id: ProposalId) -> CoreResult<()> {
        let cell = self.cell(id)?;
        let mut book = cell.book.lock();

        let mut closed = book.proposal.clone();
        closed.close(unix_timestamp())?;
        self.journal.proposal_updated(&closed)?;
        book.proposal = closed;

        info!("Closed proposal {} after {} ballots", id, book.ledger.len());
        Ok(())
    }

    pub fn get_proposal(&self, id: ProposalId) -> CoreResult<Proposal> {
        Ok(self.cell(id)?.book.lock().proposal.clone())
    }

    /// All proposals in id order
    pub fn list_proposals(&self) -> Vec<Proposal> {
        let cells: Vec<_> = self.registry.read().cells.values().cloned().collect();
        cells
            .iter()
            .map(|cell| cell.book.lock().proposal.clone())
            .collect()
    }

    pub fn proposal_count(&self) -> usize {
        self.registry.read().cells.len()
    }

    // ------------------------------------------------------------------
    // Ledger + tally
    // ------------------------------------------------------------------

    /// Accept one encrypted ballot.
    ///
    /// The uniqueness check, ledger insert, tally fold and journal write form
    /// one transaction under the proposal's critical section: either all of
    /// them take effect or none does.
    pub fn submit_ballot(&self, id: ProposalId, voter: VoterId, choice: &C) -> CoreResult<()> {
        let result = self.try_submit(id, voter, choice);
        if let Err(ref e) = result {
            warn!("Rejected ballot from {} on proposal {}: {}", voter, id, e);
        }
        result
    }

    fn try_submit(&self, id: ProposalId, voter: VoterId, choice: &C) -> CoreResult<()> {
        let cell = self.cell(id)?;
        let mut guard = cell.book.lock();
        let book = &mut *guard;

        book.ledger.check(&book.proposal, &voter)?;
        let limit = self.config.max_ballots_per_proposal;
        if book.ledger.len() >= limit {
            return Err(CoreError::BallotLimitReached { id, limit });
        }

        let folded = cell.published_tally().fold_ballot(choice, &self.eval_key)?;
        let record = folded.encode()?;

        book.ledger.record_vote(&book.proposal, voter)?;
        if let Err(e) = self.journal.ballot_accepted(id, &voter, &record) {
            book.ledger.rollback(&voter);
            return Err(e);
        }

        let ballots = folded.ballots();
        *cell.tally.write() = Arc::new(folded);

        debug!("Accepted ballot {} on proposal {}", ballots, id);
        Ok(())
    }

    /// Whether `voter` has a ballot recorded on the proposal
    pub fn has_voted(&self, id: ProposalId, voter: &VoterId) -> CoreResult<bool> {
        Ok(self.cell(id)?.book.lock().ledger.contains(voter))
    }

    /// Number of accepted ballots
    pub fn ballot_count(&self, id: ProposalId) -> CoreResult<u64> {
        Ok(self.cell(id)?.book.lock().ledger.len())
    }

    /// Digest of the proposal's ledger
    pub fn ledger_root(&self, id: ProposalId) -> CoreResult<[u8; 32]> {
        Ok(self.cell(id)?.book.lock().ledger.root_hash())
    }

    /// Current encrypted `(yes, no)` sums. Never blocks on an in-flight fold.
    pub fn get_encrypted_tallies(&self, id: ProposalId) -> CoreResult<(C, C)> {
        Ok(self.cell(id)?.published_tally().sums())
    }

    /// Current tally as one consistent snapshot
    pub fn tally_snapshot(&self, id: ProposalId) -> CoreResult<Arc<EncryptedTally<C>>> {
        Ok(self.cell(id)?.published_tally())
    }

    /// Current tally rendered for display
    pub fn tally_view(&self, id: ProposalId) -> CoreResult<TallyView> {
        self.cell(id)?.published_tally().view(id)
    }

    // ------------------------------------------------------------------
    // Disclosure
    // ------------------------------------------------------------------

    /// Decrypt and publish the final tally of a closed proposal.
    ///
    /// Single-shot: a second call fails with `AlreadyRevealed`. A
    /// `TallyMismatch` leaves the proposal closed and undisclosed.
    pub fn reveal<D>(
        &self,
        id: ProposalId,
        capability: &D,
        revealer: Identity,
    ) -> CoreResult<DisclosureRecord>
    where
        D: Decrypt<C> + ?Sized,
    {
        let cell = self.cell(id)?;
        let mut guard = cell.book.lock();
        let book = &mut *guard;
        let tally = cell.published_tally();
        let now = unix_timestamp();

        let request = DisclosureRequest {
            proposal: &book.proposal,
            ledger: &book.ledger,
            tally: &tally,
            existing: book.disclosure.as_ref(),
            eval_key: &self.eval_key,
        };
        let record = match disclose(request, capability, revealer, now) {
            Ok(record) => record,
            Err(e) => {
                if e.is_fatal() {
                    error!("Integrity fault revealing proposal {}: {}", id, e);
                }
                return Err(e);
            }
        };

        let mut revealed = book.proposal.clone();
        revealed.mark_revealed(now)?;
        self.journal.disclosed(&revealed, &record)?;

        book.proposal = revealed;
        book.disclosure = Some(record.clone());

        info!(
            "Revealed proposal {}: yes={} no={} ({:?})",
            id,
            record.yes_count,
            record.no_count,
            record.outcome()
        );
        Ok(record)
    }

    /// The disclosure record, once revealed
    pub fn get_disclosure(&self, id: ProposalId) -> CoreResult<Option<DisclosureRecord>> {
        Ok(self.cell(id)?.book.lock().disclosure.clone())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Export the full state, one proposal at a time
    pub fn snapshot(&self) -> CoreResult<CoreSnapshot> {
        let cells: Vec<_> = self.registry.read().cells.values().cloned().collect();

        let mut proposals = Vec::with_capacity(cells.len());
        for cell in cells {
            let book = cell.book.lock();
            proposals.push(ProposalSnapshot {
                proposal: book.proposal.clone(),
                voters: book.ledger.sorted_voters(),
                tally: cell.published_tally().encode()?,
                disclosure: book.disclosure.clone(),
            });
        }

        Ok(CoreSnapshot { proposals })
    }
}
