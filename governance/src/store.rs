//! Governance persistence
//!
//! The engine owns its store; there is no shared global state. Swap
//! [`InMemoryStore`] for a host-backed implementation to persist proposals.

use civitas_core::ProposalId;
use std::collections::BTreeMap;

use crate::delegation::DelegationRegistry;
use crate::proposal::Proposal;

pub trait GovernanceStore: Send + Sync {
    // Proposals
    fn put_proposal(&mut self, proposal: Proposal);
    fn get_proposal(&self, id: ProposalId) -> Option<&Proposal>;
    fn get_proposal_mut(&mut self, id: ProposalId) -> Option<&mut Proposal>;
    fn proposals(&self) -> Box<dyn Iterator<Item = &Proposal> + '_>;
    fn proposal_count(&self) -> u64;

    // Delegation edges
    fn delegations(&self) -> &DelegationRegistry;
    fn delegations_mut(&mut self) -> &mut DelegationRegistry;

    /// Allocate the next proposal id. Ids start at 1 and are never reused.
    fn next_proposal_id(&mut self) -> ProposalId;

    /// Ascending range of proposals starting at id `start`.
    fn list_proposals(&self, start: ProposalId, limit: usize) -> Vec<&Proposal> {
        self.proposals()
            .filter(|p| p.id >= start)
            .take(limit)
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    last_id: ProposalId,
    proposals: BTreeMap<ProposalId, Proposal>,
    delegations: DelegationRegistry,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GovernanceStore for InMemoryStore {
    fn put_proposal(&mut self, proposal: Proposal) {
        self.proposals.insert(proposal.id, proposal);
    }

    fn get_proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    fn get_proposal_mut(&mut self, id: ProposalId) -> Option<&mut Proposal> {
        self.proposals.get_mut(&id)
    }

    fn proposals(&self) -> Box<dyn Iterator<Item = &Proposal> + '_> {
        Box::new(self.proposals.values())
    }

    fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    fn delegations(&self) -> &DelegationRegistry {
        &self.delegations
    }

    fn delegations_mut(&mut self) -> &mut DelegationRegistry {
        &mut self.delegations
    }

    fn next_proposal_id(&mut self) -> ProposalId {
        self.last_id += 1;
        self.last_id
    }
}
