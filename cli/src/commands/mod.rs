//! CLI Commands

mod ballot;
mod init;
mod proposal;
mod reveal;

pub use ballot::{TallyCommand, VoteCommand};
pub use init::InitCommand;
pub use proposal::{CloseCommand, ProposeCommand, ShowCommand};
pub use reveal::RevealCommand;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use sealvote_cipher::{ElGamalCiphertext, PublicKey, SecretKey};
use sealvote_core::VotingCore;
use sealvote_storage::BallotStore;

use crate::config::SealvoteConfig;

/// Directory under the data dir holding the tally keypair
const KEYS_DIR: &str = "keys";
const PUBLIC_KEY_FILE: &str = "tally.pub";
const SECRET_KEY_FILE: &str = "tally.key";

pub fn public_key_path(data_dir: &Path) -> PathBuf {
    data_dir.join(KEYS_DIR).join(PUBLIC_KEY_FILE)
}

pub fn secret_key_path(data_dir: &Path) -> PathBuf {
    data_dir.join(KEYS_DIR).join(SECRET_KEY_FILE)
}

fn read_hex(path: &Path) -> anyhow::Result<Vec<u8>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read key file {}", path.display()))?;
    hex::decode(content.trim()).with_context(|| format!("Key file {} is not hex", path.display()))
}

/// An initialized data directory plus its configuration
pub struct Session {
    pub data_dir: PathBuf,
    pub config: SealvoteConfig,
}

impl Session {
    pub fn new(data_dir: PathBuf, config: SealvoteConfig) -> Self {
        Self { data_dir, config }
    }

    pub fn public_key(&self) -> anyhow::Result<PublicKey> {
        let bytes = read_hex(&public_key_path(&self.data_dir))?;
        Ok(PublicKey::from_bytes(&bytes)?)
    }

    /// Load the decryption key from `path`, or from the data dir
    pub fn secret_key(&self, path: Option<&Path>) -> anyhow::Result<SecretKey> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| secret_key_path(&self.data_dir));
        let bytes = read_hex(&path)?;
        Ok(SecretKey::from_bytes(&bytes)?)
    }

    /// Rebuild the voting core from the ballot store.
    ///
    /// Fails if the store is bound to a different tally key than the one in
    /// the data dir.
    pub fn open_core(&self) -> anyhow::Result<VotingCore<ElGamalCiphertext>> {
        let public_key = self.public_key()?;
        let store = Arc::new(BallotStore::with_config(
            self.config.storage_config(&self.data_dir),
        )?);
        store
            .bind_eval_key(&public_key.id())
            .context("Tally key does not match the ballot store")?;
        let snapshot = store.load_state()?;

        let core = VotingCore::restore(public_key, self.config.core.clone(), snapshot)?
            .with_journal(store);
        Ok(core)
    }
}
