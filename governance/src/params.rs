//! Governance parameters
//!
//! Fixed at genesis for the lifetime of an engine instance.

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};

/// Share of the snapshot supply that must take part (percent).
pub const DEFAULT_QUORUM_PERCENT: u64 = 10;

/// Share of the current supply a proposer must control (percent).
pub const DEFAULT_PROPOSAL_THRESHOLD_PERCENT: u64 = 1;

/// Voting window length (~2 weeks at ~10 min per height).
pub const DEFAULT_VOTING_PERIOD: u64 = 2_100;

/// Delay between queueing and execution (~16 hours).
pub const DEFAULT_TIMELOCK: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParameters {
    pub quorum_percent: u64,
    pub proposal_threshold_percent: u64,
    pub voting_period: u64,
    pub timelock: u64,
}

impl Default for GovernanceParameters {
    fn default() -> Self {
        Self {
            quorum_percent: DEFAULT_QUORUM_PERCENT,
            proposal_threshold_percent: DEFAULT_PROPOSAL_THRESHOLD_PERCENT,
            voting_period: DEFAULT_VOTING_PERIOD,
            timelock: DEFAULT_TIMELOCK,
        }
    }
}

impl GovernanceParameters {
    pub fn validate(&self) -> Result<()> {
        if self.quorum_percent > 100 {
            return Err(GovernanceError::InvalidParameter(format!(
                "quorum-percent {} exceeds 100",
                self.quorum_percent
            )));
        }
        if self.proposal_threshold_percent > 100 {
            return Err(GovernanceError::InvalidParameter(format!(
                "proposal-threshold-percent {} exceeds 100",
                self.proposal_threshold_percent
            )));
        }
        if self.voting_period == 0 {
            return Err(GovernanceError::InvalidParameter(
                "voting-period must be at least one height".to_string(),
            ));
        }
        Ok(())
    }

    /// Look up a single parameter by its published name. Both the
    /// kebab-case and snake_case spellings are accepted.
    pub fn get(&self, name: &str) -> Result<u64> {
        match name.replace('_', "-").as_str() {
            "quorum-percent" => Ok(self.quorum_percent),
            "proposal-threshold-percent" => Ok(self.proposal_threshold_percent),
            "voting-period" => Ok(self.voting_period),
            "timelock" => Ok(self.timelock),
            _ => Err(GovernanceError::InvalidParameter(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = GovernanceParameters::default();
        assert_eq!(params.quorum_percent, 10);
        assert_eq!(params.proposal_threshold_percent, 1);
        assert_eq!(params.voting_period, 2_100);
        assert_eq!(params.timelock, 100);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_lookup_by_name() {
        let params = GovernanceParameters::default();
        assert_eq!(params.get("quorum-percent").unwrap(), 10);
        assert_eq!(params.get("voting_period").unwrap(), 2_100);
        assert_eq!(params.get("max-supply").unwrap_err().code(), 116);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let params = GovernanceParameters {
            quorum_percent: 101,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = GovernanceParameters {
            voting_period: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
