//! Proposal commands: propose, close, show

use clap::Args;
use sealvote_cipher::HomomorphicOps;
use sealvote_core::{DisclosureRecord, Outcome, Proposal, ProposalId, VotingCore};
use serde::Serialize;

use super::Session;

/// Register a new proposal
#[derive(Args)]
pub struct ProposeCommand {
    /// Proposal title
    #[arg(short, long)]
    title: String,

    /// Proposal description
    #[arg(short, long)]
    description: String,
}

impl ProposeCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;
        let id = core.create_proposal(&self.title, &self.description)?;
        println!("Created proposal {}", id);
        Ok(())
    }
}

/// Stop accepting ballots on a proposal
#[derive(Args)]
pub struct CloseCommand {
    /// Proposal id
    proposal: u64,
}

impl CloseCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;
        let id = ProposalId::new(self.proposal);
        core.close_proposal(id)?;
        println!(
            "Closed proposal {} with {} ballots",
            id,
            core.ballot_count(id)?
        );
        Ok(())
    }
}

/// Show one proposal, or list all of them
#[derive(Args)]
pub struct ShowCommand {
    /// Proposal id (all proposals when omitted)
    proposal: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ProposalReport {
    #[serde(flatten)]
    proposal: Proposal,
    ballots: u64,
    ledger_root: String,
    disclosure: Option<DisclosureRecord>,
    outcome: Option<Outcome>,
}

fn report<C: HomomorphicOps>(
    core: &VotingCore<C>,
    proposal: Proposal,
) -> anyhow::Result<ProposalReport> {
    let id = proposal.id;
    let disclosure = core.get_disclosure(id)?;
    Ok(ProposalReport {
        ballots: core.ballot_count(id)?,
        ledger_root: hex::encode(core.ledger_root(id)?),
        outcome: disclosure.as_ref().map(DisclosureRecord::outcome),
        disclosure,
        proposal,
    })
}

impl ShowCommand {
    pub fn execute(self, session: &Session) -> anyhow::Result<()> {
        let core = session.open_core()?;

        let proposals = match self.proposal {
            Some(id) => vec![core.get_proposal(ProposalId::new(id))?],
            None => core.list_proposals(),
        };
        let reports = proposals
            .into_iter()
            .map(|p| report(&core, p))
            .collect::<anyhow::Result<Vec<_>>>()?;

        if self.json {
            if self.proposal.is_some() && reports.len() == 1 {
                println!("{}", serde_json::to_string_pretty(&reports[0])?);
            } else {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
            return Ok(());
        }

        if reports.is_empty() {
            println!("No proposals");
        }
        for r in &reports {
            println!("#{} {} [{}]", r.proposal.id, r.proposal.title, r.proposal.state);
            println!("  {}", r.proposal.description);
            println!("  Ballots:     {}", r.ballots);
            println!("  Ledger root: {}", r.ledger_root);
            if let Some(ref d) = r.disclosure {
                println!(
                    "  Result:      yes {} / no {} ({:?})",
                    d.yes_count,
                    d.no_count,
                    d.outcome()
                );
                println!("  Revealed by: {}", d.revealer);
            }
        }
        Ok(())
    }
}
