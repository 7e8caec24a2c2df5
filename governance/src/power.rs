//! Voting-power sources
//!
//! The engine never owns token balances. It asks a [`VotingPowerSource`]
//! what a principal held at a given height.

use civitas_core::{Height, Principal};
use std::collections::HashMap;

pub trait VotingPowerSource: Send + Sync {
    /// Balance of `who` as of `height`.
    fn balance_at(&self, who: &Principal, height: Height) -> u64;

    /// Total voting supply as of `height`.
    fn total_supply_at(&self, height: Height) -> u64;
}

/// In-memory checkpointed balances.
///
/// Each account keeps a list of `(height, balance)` checkpoints sorted by
/// height; the balance at `h` is the last checkpoint at or before `h`.
#[derive(Debug, Clone, Default)]
pub struct BalanceSnapshots {
    checkpoints: HashMap<Principal, Vec<(Height, u64)>>,
}

impl BalanceSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `who` holds `amount` from `height` on. A checkpoint at the
    /// same height is overwritten.
    pub fn set_balance(&mut self, who: impl Into<Principal>, height: Height, amount: u64) {
        let points = self.checkpoints.entry(who.into()).or_default();
        match points.binary_search_by_key(&height, |(h, _)| *h) {
            Ok(idx) => points[idx].1 = amount,
            Err(idx) => points.insert(idx, (height, amount)),
        }
    }

    pub fn holders(&self) -> impl Iterator<Item = &Principal> {
        self.checkpoints.keys()
    }
}

impl VotingPowerSource for BalanceSnapshots {
    fn balance_at(&self, who: &Principal, height: Height) -> u64 {
        let Some(points) = self.checkpoints.get(who) else {
            return 0;
        };
        let idx = points.partition_point(|(h, _)| *h <= height);
        if idx == 0 {
            0
        } else {
            points[idx - 1].1
        }
    }

    fn total_supply_at(&self, height: Height) -> u64 {
        self.checkpoints
            .keys()
            .map(|who| self.balance_at(who, height))
            .fold(0u64, |acc, b| acc.saturating_add(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_follows_checkpoints() {
        let mut balances = BalanceSnapshots::new();
        balances.set_balance("alice", 10, 100);
        balances.set_balance("alice", 20, 40);

        let alice = Principal::from("alice");
        assert_eq!(balances.balance_at(&alice, 5), 0);
        assert_eq!(balances.balance_at(&alice, 10), 100);
        assert_eq!(balances.balance_at(&alice, 19), 100);
        assert_eq!(balances.balance_at(&alice, 20), 40);
        assert_eq!(balances.balance_at(&alice, 1_000), 40);
    }

    #[test]
    fn test_out_of_order_checkpoints() {
        let mut balances = BalanceSnapshots::new();
        balances.set_balance("bob", 20, 7);
        balances.set_balance("bob", 10, 3);
        balances.set_balance("bob", 20, 9);

        let bob = Principal::from("bob");
        assert_eq!(balances.balance_at(&bob, 15), 3);
        assert_eq!(balances.balance_at(&bob, 25), 9);
    }

    #[test]
    fn test_total_supply() {
        let mut balances = BalanceSnapshots::new();
        for who in ["a", "b", "c"] {
            balances.set_balance(who, 0, 1);
        }
        balances.set_balance("d", 50, 7);
        balances.set_balance("a", 60, 1);
        assert_eq!(balances.total_supply_at(0), 3);
        assert_eq!(balances.total_supply_at(50), 10);
        assert_eq!(balances.total_supply_at(60), 10);
        assert_eq!(balances.holders().count(), 4);
    }
}
