//! Voting core configuration

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Limits enforced by the voting core
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Maximum proposal title length in bytes
    pub max_title_len: usize,
    /// Maximum proposal description length in bytes
    pub max_description_len: usize,
    /// Maximum ballots accepted per proposal (bounds tally decryption)
    pub max_ballots_per_proposal: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_title_len: 256,
            max_description_len: 4096,
            max_ballots_per_proposal: 1_000_000,
        }
    }
}

impl CoreConfig {
    /// Check the limits are usable
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_title_len == 0 || self.max_description_len == 0 {
            return Err(CoreError::InvalidInput(
                "Title and description limits must be greater than 0".into(),
            ));
        }
        if self.max_ballots_per_proposal == 0 {
            return Err(CoreError::InvalidInput(
                "Ballot limit must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_ballots_per_proposal, 1_000_000);
    }

    #[test]
    fn test_zero_ballot_limit_rejected() {
        let config = CoreConfig {
            max_ballots_per_proposal: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
