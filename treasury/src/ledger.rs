//! Asset balances held by the hosting ledger
//!
//! The vault does not own a separate book: it is one account among many in
//! an [`AssetLedger`], so a disbursement is a debit of the vault account and
//! a credit of the recipient in the same structure.

use civitas_core::Principal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TreasuryError};

/// A fungible unit the ledger can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// The chain's native unit.
    Native,
    /// A fungible token, identified by its contract principal.
    Token(Principal),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Token(token) => write!(f, "{}", token),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    balances: HashMap<Asset, HashMap<Principal, u64>>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, asset: &Asset, who: &Principal) -> u64 {
        self.balances
            .get(asset)
            .and_then(|accounts| accounts.get(who))
            .copied()
            .unwrap_or(0)
    }

    /// Mint into an account. Used for genesis funding and deposits.
    pub fn credit(&mut self, asset: &Asset, who: &Principal, amount: u64) -> Result<()> {
        let current = self.balance_of(asset, who);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::BalanceOverflow(who.clone()))?;
        self.balances
            .entry(asset.clone())
            .or_default()
            .insert(who.clone(), updated);
        Ok(())
    }

    /// Move `amount` of `asset` between accounts. Either both sides change or
    /// neither does.
    pub fn transfer(
        &mut self,
        asset: &Asset,
        from: &Principal,
        to: &Principal,
        amount: u64,
    ) -> Result<()> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::BalanceOverflow(to.clone()))?;

        let accounts = self.balances.entry(asset.clone()).or_default();
        accounts.insert(from.clone(), available - amount);
        accounts.insert(to.clone(), credited);
        Ok(())
    }
}
