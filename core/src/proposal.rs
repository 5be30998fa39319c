//! Proposals and their lifecycle
//!
//! ```text
//! Open ──close──▶ Closed ──reveal──▶ Revealed
//! ```
//! Transitions are strictly forward and never skip a state.

use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::errors::{CoreError, CoreResult};

/// Monotonically assigned proposal identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier assigned after this one, `None` once the id space is exhausted
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for ProposalId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProposalId({})", self.0)
    }
}

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Accepting ballots
    Open,
    /// Voting ended, tally sealed but not decrypted
    Closed,
    /// Tally decrypted and published
    Revealed,
}

impl ProposalState {
    /// The only state reachable from this one
    pub fn successor(self) -> Option<Self> {
        match self {
            ProposalState::Open => Some(ProposalState::Closed),
            ProposalState::Closed => Some(ProposalState::Revealed),
            ProposalState::Revealed => None,
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self.successor() == Some(next)
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalState::Open => "open",
            ProposalState::Closed => "closed",
            ProposalState::Revealed => "revealed",
        };
        f.write_str(s)
    }
}

/// Proposal metadata and lifecycle state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub state: ProposalState,
    /// Unix seconds
    pub created_at: u64,
    pub closed_at: Option<u64>,
    pub revealed_at: Option<u64>,
}

impl Proposal {
    /// Create an open proposal, validating title and description
    pub fn new(
        id: ProposalId,
        title: &str,
        description: &str,
        config: &CoreConfig,
        now: u64,
    ) -> CoreResult<Self> {
        let title = title.trim();
        let description = description.trim();

        if title.is_empty() {
            return Err(CoreError::InvalidInput("Title must not be empty".into()));
        }
        if description.is_empty() {
            return Err(CoreError::InvalidInput("Description must not be empty".into()));
        }
        if title.len() > config.max_title_len {
            return Err(CoreError::InvalidInput(format!(
                "Title exceeds {} bytes",
                config.max_title_len
            )));
        }
        if description.len() > config.max_description_len {
            return Err(CoreError::InvalidInput(format!(
                "Description exceeds {} bytes",
                config.max_description_len
            )));
        }

        Ok(Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            state: ProposalState::Open,
            created_at: now,
            closed_at: None,
            revealed_at: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == ProposalState::Open
    }

    /// `Open -> Closed`
    pub(crate) fn close(&mut self, now: u64) -> CoreResult<()> {
        if self.state != ProposalState::Open {
            return Err(CoreError::NotOpen {
                id: self.id,
                state: self.state,
            });
        }
        self.advance(ProposalState::Closed);
        self.closed_at = Some(now);
        Ok(())
    }

    /// `Closed -> Revealed`
    pub(crate) fn mark_revealed(&mut self, now: u64) -> CoreResult<()> {
        match self.state {
            ProposalState::Closed => {
                self.advance(ProposalState::Revealed);
                self.revealed_at = Some(now);
                Ok(())
            }
            ProposalState::Revealed => Err(CoreError::AlreadyRevealed(self.id)),
            ProposalState::Open => Err(CoreError::NotClosed {
                id: self.id,
                state: self.state,
            }),
        }
    }

    fn advance(&mut self, next: ProposalState) {
        debug_assert!(self.state.can_transition_to(next));
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_proposal() -> Proposal {
        Proposal::new(
            ProposalId::new(0),
            "Upgrade Treaty",
            "Adopt the revised treaty text",
            &CoreConfig::default(),
            1_700_000_000,
        )
        .unwrap()
    }

    #[test]
    fn test_next_id_is_checked() {
        assert_eq!(ProposalId::new(4).next(), Some(ProposalId::new(5)));
        assert_eq!(ProposalId::new(u64::MAX).next(), None);
    }

    #[test]
    fn test_new_proposal_is_open() {
        let proposal = open_proposal();
        assert!(proposal.is_open());
        assert_eq!(proposal.created_at, 1_700_000_000);
        assert!(proposal.closed_at.is_none());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let config = CoreConfig::default();
        assert!(matches!(
            Proposal::new(ProposalId::new(0), "  ", "text", &config, 0),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            Proposal::new(ProposalId::new(0), "title", "", &config, 0),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_title_rejected() {
        let config = CoreConfig {
            max_title_len: 4,
            ..Default::default()
        };
        assert!(Proposal::new(ProposalId::new(0), "too long", "text", &config, 0).is_err());
    }

    #[test]
    fn test_lifecycle_is_strictly_forward() {
        let mut proposal = open_proposal();

        assert!(matches!(
            proposal.mark_revealed(1),
            Err(CoreError::NotClosed { .. })
        ));

        proposal.close(2).unwrap();
        assert_eq!(proposal.state, ProposalState::Closed);
        assert!(matches!(proposal.close(3), Err(CoreError::NotOpen { .. })));

        proposal.mark_revealed(4).unwrap();
        assert_eq!(proposal.state, ProposalState::Revealed);
        assert_eq!(proposal.revealed_at, Some(4));
        assert!(matches!(
            proposal.mark_revealed(5),
            Err(CoreError::AlreadyRevealed(_))
        ));
        assert!(matches!(proposal.close(6), Err(CoreError::NotOpen { .. })));
    }

    #[test]
    fn test_state_successors() {
        assert!(ProposalState::Open.can_transition_to(ProposalState::Closed));
        assert!(!ProposalState::Open.can_transition_to(ProposalState::Revealed));
        assert!(!ProposalState::Closed.can_transition_to(ProposalState::Open));
        assert_eq!(ProposalState::Revealed.successor(), None);
    }
}
