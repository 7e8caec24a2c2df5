//! Vote tallying and the pass predicate

use civitas_core::{Height, ProposalId, VoteChoice};
use serde::{Deserialize, Serialize};

use crate::params::GovernanceParameters;
use crate::proposal::{Proposal, ProposalStatus};

/// Running vote totals for one proposal. Only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
}

impl Tally {
    pub fn record(&mut self, choice: VoteChoice, weight: u64) {
        let slot = match choice {
            VoteChoice::For => &mut self.for_votes,
            VoteChoice::Against => &mut self.against_votes,
            VoteChoice::Abstain => &mut self.abstain_votes,
        };
        *slot = slot.saturating_add(weight);
    }

    pub fn total(&self) -> u64 {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }

    /// `total * 100 >= supply * quorum_percent`, computed without overflow.
    pub fn quorum_met(&self, supply: u64, quorum_percent: u64) -> bool {
        self.total() as u128 * 100 >= supply as u128 * quorum_percent as u128
    }

    /// Strict: a tie does not carry.
    pub fn majority(&self) -> bool {
        self.for_votes > self.against_votes
    }

    /// Share of for-votes among for + against, as a percentage.
    pub fn approval_percentage(&self) -> f64 {
        let decisive = self.for_votes as f64 + self.against_votes as f64;
        if decisive == 0.0 {
            return 0.0;
        }
        self.for_votes as f64 / decisive * 100.0
    }

    /// Share of `supply` that cast any vote, as a percentage.
    pub fn participation_rate(&self, supply: u64) -> f64 {
        if supply == 0 {
            return 0.0;
        }
        self.total() as f64 / supply as f64 * 100.0
    }
}

/// Quorum met, strict majority, and the voting window has closed.
pub fn proposal_passes(proposal: &Proposal, params: &GovernanceParameters, height: Height) -> bool {
    height >= proposal.end_height
        && proposal.tally.quorum_met(proposal.snapshot_supply, params.quorum_percent)
        && proposal.tally.majority()
}

/// Read-only vote summary for one proposal at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposalStats {
    pub id: ProposalId,
    pub status: ProposalStatus,
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
    pub total_votes: u64,
    pub snapshot_supply: u64,
    pub approval_percentage: f64,
    pub participation_rate: f64,
    pub quorum_met: bool,
    pub passes: bool,
}

impl ProposalStats {
    pub fn of(proposal: &Proposal, params: &GovernanceParameters, height: Height) -> Self {
        let tally = proposal.tally;
        Self {
            id: proposal.id,
            status: proposal.status(height),
            for_votes: tally.for_votes,
            against_votes: tally.against_votes,
            abstain_votes: tally.abstain_votes,
            total_votes: tally.total(),
            snapshot_supply: proposal.snapshot_supply,
            approval_percentage: tally.approval_percentage(),
            participation_rate: tally.participation_rate(proposal.snapshot_supply),
            quorum_met: tally.quorum_met(proposal.snapshot_supply, params.quorum_percent),
            passes: proposal_passes(proposal, params, height),
        }
    }
}
