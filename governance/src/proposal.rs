//! Proposal records and lifecycle status

use civitas_core::{Fingerprint, Height, Payload, Principal, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::tally::Tally;

/// Adapter a proposal is bound to, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterPin {
    pub address: Principal,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Principal,
    pub adapter: AdapterPin,
    pub payload: Payload,
    pub start_height: Height,
    pub end_height: Height,
    /// Earliest execution height. Set when queued.
    pub eta: Option<Height>,
    #[serde(flatten)]
    pub tally: Tally,
    /// Total supply at `start_height`; quorum is measured against it.
    pub snapshot_supply: u64,
    pub executed: bool,
    pub cancelled: bool,
    #[serde(default)]
    pub voted: BTreeSet<Principal>,
}

impl Proposal {
    pub fn has_voted(&self, who: &Principal) -> bool {
        self.voted.contains(who)
    }

    pub fn is_queued(&self) -> bool {
        self.eta.is_some()
    }

    /// Executed and cancelled proposals never change again.
    pub fn is_final(&self) -> bool {
        self.executed || self.cancelled
    }

    pub fn voting_open(&self, height: Height) -> bool {
        !self.is_final() && height < self.end_height
    }

    pub fn status(&self, height: Height) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.cancelled {
            ProposalStatus::Cancelled
        } else if let Some(eta) = self.eta {
            if height >= eta {
                ProposalStatus::Executable
            } else {
                ProposalStatus::Queued
            }
        } else if height >= self.end_height {
            ProposalStatus::VotingEnded
        } else {
            ProposalStatus::Active
        }
    }
}

/// Lifecycle stage, derived from the stored flags and the current height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Active,
    VotingEnded,
    Queued,
    Executable,
    Executed,
    Cancelled,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProposalStatus::Active => "active",
            ProposalStatus::VotingEnded => "voting-ended",
            ProposalStatus::Queued => "queued",
            ProposalStatus::Executable => "executable",
            ProposalStatus::Executed => "executed",
            ProposalStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal() -> Proposal {
        Proposal {
            id: 1,
            proposer: Principal::from("alice"),
            adapter: AdapterPin {
                address: Principal::from("deployer.transfer-adapter-v1"),
                fingerprint: Fingerprint::of(b"transfer-adapter:v1"),
            },
            payload: Payload::simple(100, "bob"),
            start_height: 10,
            end_height: 20,
            eta: None,
            tally: Tally::default(),
            snapshot_supply: 1_000,
            executed: false,
            cancelled: false,
            voted: BTreeSet::new(),
        }
    }

    #[test]
    fn test_status_progression() {
        let mut p = proposal();
        assert_eq!(p.status(10), ProposalStatus::Active);
        assert_eq!(p.status(19), ProposalStatus::Active);
        assert_eq!(p.status(20), ProposalStatus::VotingEnded);

        p.eta = Some(30);
        assert_eq!(p.status(25), ProposalStatus::Queued);
        assert_eq!(p.status(30), ProposalStatus::Executable);

        p.executed = true;
        assert_eq!(p.status(30), ProposalStatus::Executed);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut p = proposal();
        p.eta = Some(30);
        p.cancelled = true;
        assert_eq!(p.status(100), ProposalStatus::Cancelled);
        assert!(!p.voting_open(11));
    }

    #[test]
    fn test_json_shape() {
        let p = proposal();
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["for_votes"], 0);
        assert_eq!(value["payload"]["kind"], "simple-transfer");
        assert_eq!(value["eta"], serde_json::Value::Null);

        let back: Proposal = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }
}
