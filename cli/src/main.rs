//! SEALVOTE CLI
//!
//! Operator interface for a local confidential voting store.
//!
//! # Usage
//!
//! ```bash
//! # Create config, tally keypair and an empty ballot store
//! sealvote init
//!
//! # Register a proposal and collect encrypted ballots
//! sealvote propose --title "Upgrade Treaty" --description "Adopt v2"
//! sealvote vote 0 --voter alice --choice yes
//!
//! # Close, then decrypt the final counts
//! sealvote close 0
//! sealvote reveal 0
//! sealvote show 0 --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::{
    CloseCommand, InitCommand, ProposeCommand, RevealCommand, Session, ShowCommand,
    TallyCommand, VoteCommand,
};
use config::{default_config_path, default_data_dir, LoggingSettings, SealvoteConfig};

/// SEALVOTE confidential voting
#[derive(Parser)]
#[command(name = "sealvote")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Confidential yes/no voting with encrypted tallies", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(long, global = true, env = "SEALVOTE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data directory
    Init(InitCommand),

    /// Register a new proposal
    Propose(ProposeCommand),

    /// Cast an encrypted ballot
    Vote(VoteCommand),

    /// Close a proposal
    Close(CloseCommand),

    /// Show encrypted running sums
    Tally(TallyCommand),

    /// Decrypt the final counts of a closed proposal
    Reveal(RevealCommand),

    /// Show proposals and disclosed results
    Show(ShowCommand),

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let config_path = cli
        .config
        .unwrap_or_else(|| default_config_path(&data_dir));

    let config = if config_path.exists() {
        Some(SealvoteConfig::load(&config_path)?)
    } else {
        None
    };

    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingSettings::default);
    let level = cli.log_level.unwrap_or(logging.level);
    logging::init(&level, cli.json_logs || logging.format == "json")?;

    let session = || -> anyhow::Result<Session> {
        let config = config.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No configuration at {}. Run `sealvote init` first.",
                config_path.display()
            )
        })?;
        Ok(Session::new(data_dir.clone(), config))
    };

    match cli.command {
        Commands::Init(cmd) => cmd.execute(&data_dir, &config_path),
        Commands::Propose(cmd) => cmd.execute(&session()?),
        Commands::Vote(cmd) => cmd.execute(&session()?),
        Commands::Close(cmd) => cmd.execute(&session()?),
        Commands::Tally(cmd) => cmd.execute(&session()?),
        Commands::Reveal(cmd) => cmd.execute(&session()?),
        Commands::Show(cmd) => cmd.execute(&session()?),
        Commands::Version => {
            println!("sealvote {}", env!("CARGO_PKG_VERSION"));
            println!("Ballot cipher: exponential ElGamal over Ristretto255");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_shorts_parse() {
        let cli = Cli::try_parse_from(["sealvote", "propose", "-t", "Treaty", "-d", "Adopt v2"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Propose(_)));

        let cli = Cli::try_parse_from(["sealvote", "vote", "0", "-v", "alice", "-c", "yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Vote(_)));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_options_are_long_only() {
        let cli = Cli::try_parse_from([
            "sealvote",
            "close",
            "3",
            "--data-dir",
            "/tmp/sealvote",
            "--config",
            "/tmp/sealvote/config.toml",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/sealvote")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sealvote/config.toml")));
    }
}
