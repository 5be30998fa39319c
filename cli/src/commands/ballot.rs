//! Ballot commands: vote, tally

use clap::{Args, ValueEnum};
use rand::rngs::OsRng;
use sealvote_cipher::ElGamalCiphertext;
use sealvote_core::{ProposalId, VoterId};
use tracing::debug;

use super::Session;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Choice {
    Yes,
    No,
}

/// Encrypt a yes/no choice locally and submit it
#[derive(Args)]
pub struct VoteCommand {
    /// Proposal id
    proposal: u64,

    /// Voter handle (wallet address, email, ...); hashed into a voter id
    #[arg(short, long)]
    voter: String,

    /// Ballot choice
    #[arg(short, long, value_enum)]
    choice: Choice,
}

impl VoteCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;
        let id = ProposalId::new(self.proposal);
        let voter = VoterId::derive(&self.voter);

        let ballot = ElGamalCiphertext::encrypt_choice(
            matches!(self.choice, Choice::Yes),
            core.eval_key(),
            &mut OsRng,
        );
        debug!("Encrypted ballot for voter {}", voter);

        core.submit_ballot(id, voter, &ballot)?;
        println!("Ballot accepted on proposal {} (voter {})", id, voter);
        Ok(())
    }
}

/// Show the encrypted running sums
#[derive(Args)]
pub struct TallyCommand {
    /// Proposal id
    proposal: u64,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl TallyCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;
        let view = core.tally_view(ProposalId::new(self.proposal))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            println!("Proposal {} ({} ballots)", view.proposal, view.ballots);
            println!("  yes: {}", view.yes);
            println!("  no:  {}", view.no);
        }
        Ok(())
    }
}
