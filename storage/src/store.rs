//! Ballot store: the redb implementation of [`VoteJournal`]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, Durability, ReadableTable, TableDefinition, WriteTransaction};
use sealvote_core::{
    CoreResult, CoreSnapshot, DisclosureRecord, Proposal, ProposalId, ProposalSnapshot,
    TallyRecord, VoteJournal, VoterId,
};
use tracing::info;

use crate::{StorageConfig, StorageError, StorageResult};

/// Store metadata (format version)
const META: TableDefinition<&str, u32> = TableDefinition::new("meta");

/// Proposal records by id
const PROPOSALS: TableDefinition<u64, &[u8]> = TableDefinition::new("proposals");

/// Ledger membership: key is `proposal id (BE) || voter`, value is the proposal id
const LEDGER: TableDefinition<&[u8], u64> = TableDefinition::new("ledger");

/// Encrypted tallies by proposal id
const TALLIES: TableDefinition<u64, &[u8]> = TableDefinition::new("tallies");

/// Disclosure records by proposal id
const DISCLOSURES: TableDefinition<u64, &[u8]> = TableDefinition::new("disclosures");

/// Identifiers the store is bound to (the evaluation key its tallies are under)
const BINDINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("bindings");

const EVAL_KEY_ID: &str = "eval_key_id";

const FORMAT_KEY: &str = "format_version";
const FORMAT_VERSION: u32 = 1;

const LEDGER_KEY_LEN: usize = 8 + 32;

fn ledger_key(proposal: ProposalId, voter: &VoterId) -> [u8; LEDGER_KEY_LEN] {
    let mut key = [0u8; LEDGER_KEY_LEN];
    key[..8].copy_from_slice(&proposal.value().to_be_bytes());
    key[8..].copy_from_slice(voter.as_bytes());
    key
}

fn split_ledger_key(key: &[u8]) -> StorageResult<(u64, VoterId)> {
    if key.len() != LEDGER_KEY_LEN {
        return Err(StorageError::Corruption(format!(
            "Ledger key has {} bytes",
            key.len()
        )));
    }
    let mut id = [0u8; 8];
    id.copy_from_slice(&key[..8]);
    let mut voter = [0u8; 32];
    voter.copy_from_slice(&key[8..]);
    Ok((u64::from_be_bytes(id), VoterId::from_bytes(voter)))
}

fn key_id_from_slice(bytes: &[u8]) -> StorageResult<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        StorageError::Corruption(format!("Bound key id has {} bytes", bytes.len()))
    })
}

/// Row counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub proposals: u64,
    pub ballots: u64,
    pub disclosures: u64,
}

/// Durable journal for a [`sealvote_core::VotingCore`]
pub struct BallotStore {
    db: Arc<Database>,
    config: StorageConfig,
}

impl BallotStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(StorageConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Open a store with custom configuration
    pub fn with_config(config: StorageConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&config.path)?;

        let write_txn = db.begin_write()?;
        {
            let mut meta = write_txn.open_table(META)?;
            let found = meta.get(FORMAT_KEY)?.map(|v| v.value());
            match found {
                Some(version) if version != FORMAT_VERSION => {
                    return Err(StorageError::UnsupportedFormat {
                        found: version,
                        expected: FORMAT_VERSION,
                    });
                }
                Some(_) => {}
                None => {
                    meta.insert(FORMAT_KEY, FORMAT_VERSION)?;
                }
            }

            let _ = write_txn.open_table(PROPOSALS)?;
            let _ = write_txn.open_table(LEDGER)?;
            let _ = write_txn.open_table(TALLIES)?;
            let _ = write_txn.open_table(DISCLOSURES)?;
            let _ = write_txn.open_table(BINDINGS)?;
        }
        write_txn.commit()?;

        info!("Opened ballot store at {}", config.path.display());
        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn begin_write(&self) -> StorageResult<WriteTransaction> {
        let mut txn = self.db.begin_write()?;
        if !self.config.durable_commits {
            txn.set_durability(Durability::Eventual);
        }
        Ok(txn)
    }

    /// Read everything back as a snapshot for `VotingCore::restore`.
    ///
    /// Fails with `Corruption` if a ledger row or tally has no proposal, or a
    /// proposal has no tally.
    pub fn load_state(&self) -> StorageResult<CoreSnapshot> {
        let read_txn = self.db.begin_read()?;
        let proposals = read_txn.open_table(PROPOSALS)?;
        let ledger = read_txn.open_table(LEDGER)?;
        let tallies = read_txn.open_table(TALLIES)?;
        let disclosures = read_txn.open_table(DISCLOSURES)?;

        let mut voters: BTreeMap<u64, Vec<VoterId>> = BTreeMap::new();
        for entry in ledger.iter()? {
            let (key, _) = entry?;
            let (id, voter) = split_ledger_key(key.value())?;
            voters.entry(id).or_default().push(voter);
        }

        let mut snapshot = CoreSnapshot::default();
        for entry in proposals.iter()? {
            let (key, value) = entry?;
            let id = key.value();

            let proposal: Proposal = bincode::deserialize(value.value())?;
            if proposal.id.value() != id {
                return Err(StorageError::Corruption(format!(
                    "Proposal row {} holds proposal {}",
                    id, proposal.id
                )));
            }

            let tally: TallyRecord = match tallies.get(id)? {
                Some(data) => bincode::deserialize(data.value())?,
                None => {
                    return Err(StorageError::Corruption(format!(
                        "Proposal {} has no tally",
                        id
                    )))
                }
            };

            let disclosure: Option<DisclosureRecord> = match disclosures.get(id)? {
                Some(data) => Some(bincode::deserialize(data.value())?),
                None => None,
            };

            snapshot.proposals.push(ProposalSnapshot {
                proposal,
                voters: voters.remove(&id).unwrap_or_default(),
                tally,
                disclosure,
            });
        }

        if let Some(orphan) = voters.keys().next() {
            return Err(StorageError::Corruption(format!(
                "Ledger rows for unknown proposal {}",
                orphan
            )));
        }
        if tallies.len()? != snapshot.proposals.len() as u64 {
            return Err(StorageError::Corruption(
                "Tally rows without proposals".into(),
            ));
        }

        info!("Loaded {} proposals from ballot store", snapshot.proposals.len());
        Ok(snapshot)
    }

    /// Id of the evaluation key this store's tallies are encrypted under
    pub fn eval_key_id(&self) -> StorageResult<Option<[u8; 32]>> {
        let read_txn = self.db.begin_read()?;
        let bindings = read_txn.open_table(BINDINGS)?;
        let found = bindings.get(EVAL_KEY_ID)?.map(|v| v.value().to_vec());
        found.map(|bytes| key_id_from_slice(&bytes)).transpose()
    }

    /// Bind the store to an evaluation key on first use; afterwards only the
    /// same key is accepted.
    pub fn bind_eval_key(&self, key_id: &[u8; 32]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut bindings = write_txn.open_table(BINDINGS)?;
            let found = bindings.get(EVAL_KEY_ID)?.map(|v| v.value().to_vec());
            match found {
                Some(bytes) => {
                    let bound = key_id_from_slice(&bytes)?;
                    if &bound != key_id {
                        return Err(StorageError::KeyMismatch {
                            bound: hex::encode(&bound[..8]),
                            offered: hex::encode(&key_id[..8]),
                        });
                    }
                }
                None => {
                    bindings.insert(EVAL_KEY_ID, key_id.as_slice())?;
                    info!("Bound ballot store to key {}", hex::encode(&key_id[..8]));
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Replace the bound evaluation key. Refused once any proposal exists,
    /// since its tally is encrypted under the old key.
    pub fn rebind_eval_key(&self, key_id: &[u8; 32]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let proposals = write_txn.open_table(PROPOSALS)?.len()?;
            if proposals > 0 {
                return Err(StorageError::NotEmpty { proposals });
            }
            let mut bindings = write_txn.open_table(BINDINGS)?;
            bindings.insert(EVAL_KEY_ID, key_id.as_slice())?;
        }
        write_txn.commit()?;
        info!("Rebound ballot store to key {}", hex::encode(&key_id[..8]));
        Ok(())
    }

    pub fn stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let stats = StorageStats {
            proposals: read_txn.open_table(PROPOSALS)?.len()?,
            ballots: read_txn.open_table(LEDGER)?.len()?,
            disclosures: read_txn.open_table(DISCLOSURES)?.len()?,
        };
        Ok(stats)
    }

    fn write_created(&self, proposal: &Proposal, tally: &TallyRecord) -> StorageResult<()> {
        let proposal_bytes = bincode::serialize(proposal)?;
        let tally_bytes = bincode::serialize(tally)?;
        let id = proposal.id.value();

        let write_txn = self.begin_write()?;
        {
            let mut proposals = write_txn.open_table(PROPOSALS)?;
            let mut tallies = write_txn.open_table(TALLIES)?;
            proposals.insert(id, proposal_bytes.as_slice())?;
            tallies.insert(id, tally_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn write_ballot(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        tally: &TallyRecord,
    ) -> StorageResult<()> {
        let tally_bytes = bincode::serialize(tally)?;
        let key = ledger_key(proposal, voter);

        let write_txn = self.begin_write()?;
        {
            let mut ledger = write_txn.open_table(LEDGER)?;
            let mut tallies = write_txn.open_table(TALLIES)?;
            if ledger.insert(key.as_slice(), proposal.value())?.is_some() {
                return Err(StorageError::Corruption(format!(
                    "Voter {} already journaled on proposal {}",
                    voter, proposal
                )));
            }
            tallies.insert(proposal.value(), tally_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn write_proposal(&self, proposal: &Proposal) -> StorageResult<()> {
        let proposal_bytes = bincode::serialize(proposal)?;

        let write_txn = self.begin_write()?;
        {
            let mut proposals = write_txn.open_table(PROPOSALS)?;
            proposals.insert(proposal.id.value(), proposal_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn write_disclosure(&self, proposal: &Proposal, record: &DisclosureRecord) -> StorageResult<()> {
        let proposal_bytes = bincode::serialize(proposal)?;
        let record_bytes = bincode::serialize(record)?;
        let id = proposal.id.value();

        let write_txn = self.begin_write()?;
        {
            let mut proposals = write_txn.open_table(PROPOSALS)?;
            let mut disclosures = write_txn.open_table(DISCLOSURES)?;
            proposals.insert(id, proposal_bytes.as_slice())?;
            disclosures.insert(id, record_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl VoteJournal for BallotStore {
    fn proposal_created(&self, proposal: &Proposal, tally: &TallyRecord) -> CoreResult<()> {
        Ok(self.write_created(proposal, tally)?)
    }

    fn ballot_accepted(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        tally: &TallyRecord,
    ) -> CoreResult<()> {
        Ok(self.write_ballot(proposal, voter, tally)?)
    }

    fn proposal_updated(&self, proposal: &Proposal) -> CoreResult<()> {
        Ok(self.write_proposal(proposal)?)
    }

    fn disclosed(&self, proposal: &Proposal, record: &DisclosureRecord) -> CoreResult<()> {
        Ok(self.write_disclosure(proposal, record)?)
    }
}
