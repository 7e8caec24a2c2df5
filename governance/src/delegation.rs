//! Vote delegation
//!
//! Each principal may point its voting weight at one delegate. Resolution is
//! a single hop: weight delegated to someone who delegates onward stays with
//! the first delegate.

use civitas_core::{Height, Principal};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GovernanceError, Result};
use crate::power::VotingPowerSource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRegistry {
    outbound: BTreeMap<Principal, Principal>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `delegator`'s weight at `delegate`, replacing any previous edge.
    pub fn delegate(&mut self, delegator: &Principal, delegate: Principal) -> Result<bool> {
        if &delegate == delegator {
            return Err(GovernanceError::InvalidRecipient(delegate));
        }
        info!("{} delegates voting power to {}", delegator, delegate);
        self.outbound.insert(delegator.clone(), delegate);
        Ok(true)
    }

    /// Always succeeds, even when nothing was delegated.
    pub fn revoke(&mut self, delegator: &Principal) -> bool {
        if let Some(previous) = self.outbound.remove(delegator) {
            info!("{} revoked delegation to {}", delegator, previous);
        }
        true
    }

    pub fn delegate_of(&self, delegator: &Principal) -> Option<&Principal> {
        self.outbound.get(delegator)
    }

    pub fn delegators_of<'a>(&'a self, delegate: &'a Principal) -> impl Iterator<Item = &'a Principal> + 'a {
        self.outbound
            .iter()
            .filter(move |(_, to)| *to == delegate)
            .map(|(from, _)| from)
    }

    pub fn len(&self) -> usize {
        self.outbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    /// Own balance plus the balances of everyone currently delegating to
    /// `who`, all read at `height`.
    pub fn effective_weight(
        &self,
        power: &dyn VotingPowerSource,
        who: &Principal,
        height: Height,
    ) -> u64 {
        self.delegators_of(who)
            .map(|from| power.balance_at(from, height))
            .fold(power.balance_at(who, height), u64::saturating_add)
    }
}
