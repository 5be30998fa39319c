//! Init Command - prepare a data directory

use std::fs;
use std::path::Path;

use clap::Args;
use sealvote_cipher::KeyPair;
use sealvote_storage::BallotStore;
use tracing::info;

use super::{public_key_path, secret_key_path};
use crate::config::SealvoteConfig;

/// Initialize a data directory with config, tally keypair and an empty store
#[derive(Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration and keys
    #[arg(short, long)]
    force: bool,

    /// Do not write the secret key; only the public key is kept locally
    #[arg(long)]
    public_only: bool,
}

impl InitCommand {
    pub fn execute(self, data_dir: &Path, config_path: &Path) -> anyhow::Result<()> {
        info!("Initializing SEALVOTE data directory {}", data_dir.display());

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Already initialized at {}. Use --force to overwrite.",
                data_dir.display()
            );
        }

        fs::create_dir_all(data_dir)?;
        let config = SealvoteConfig::default();

        let store = BallotStore::with_config(config.storage_config(data_dir))?;
        let existing = store.stats()?.proposals;
        if existing > 0 {
            anyhow::bail!(
                "Ballot store {} holds {} proposals encrypted under the current key; refusing to replace it.",
                store.config().path.display(),
                existing
            );
        }

        config.save(config_path)?;
        info!("Configuration saved to {}", config_path.display());

        let keypair = KeyPair::generate();
        let pub_path = public_key_path(data_dir);
        if let Some(parent) = pub_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&pub_path, hex::encode(keypair.public.to_bytes()))?;

        let secret_path = secret_key_path(data_dir);
        if self.public_only {
            println!("Secret key (store it offline, it is not saved):");
            println!("  {}", hex::encode(keypair.secret.to_bytes()));
        } else {
            fs::write(&secret_path, hex::encode(keypair.secret.to_bytes()))?;
        }

        store.rebind_eval_key(&keypair.public.id())?;

        println!();
        println!("SEALVOTE initialized");
        println!();
        println!("Configuration: {}", config_path.display());
        println!("Ballot store:  {}", store.config().path.display());
        println!("Public key:    {}", pub_path.display());
        if !self.public_only {
            println!("Secret key:    {}", secret_path.display());
        }
        println!("Key id:        {}", hex::encode(&keypair.public.id()[..8]));

        Ok(())
    }
}
