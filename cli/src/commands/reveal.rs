//! Reveal Command - decrypt and publish final counts

use std::path::PathBuf;

use clap::Args;
use sealvote_core::{Identity, ProposalId};

use super::Session;

/// Decrypt the final tally of a closed proposal
#[derive(Args)]
pub struct RevealCommand {
    /// Proposal id
    proposal: u64,

    /// Revealer handle recorded in the disclosure
    #[arg(short, long, default_value = "operator")]
    revealer: String,

    /// Secret key file (defaults to the one in the data directory)
    #[arg(short, long)]
    key: Option<PathBuf>,
}

impl RevealCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;
        let secret = session.secret_key(self.key.as_deref())?;

        let record = core.reveal(
            ProposalId::new(self.proposal),
            &secret,
            Identity::derive(&self.revealer),
        )?;

        println!("Proposal {} revealed", record.proposal);
        println!("  yes:     {}", record.yes_count);
        println!("  no:      {}", record.no_count);
        println!("  outcome: {:?}", record.outcome());
        Ok(())
    }
}
