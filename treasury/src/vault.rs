//! Treasury Vault
//!
//! Holds the community funds. Money only leaves through [`TreasuryVault::transfer`],
//! and only when the invoking principal is an execution adapter the governor
//! has allowed.

use civitas_core::Principal;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, TreasuryError};
use crate::ledger::{Asset, AssetLedger};

/// One completed outbound transfer, kept for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disbursement {
    pub invoker: Principal,
    pub asset: Asset,
    pub amount: u64,
    pub recipient: Principal,
}

#[derive(Debug, Clone)]
pub struct TreasuryVault {
    address: Principal,
    deployer: Principal,
    governor: Option<Principal>,
    allowed_invokers: BTreeSet<Principal>,
    ledger: AssetLedger,
    disbursements: Vec<Disbursement>,
}

impl TreasuryVault {
    /// Create an empty, uninitialized vault. Only `deployer` may call `init`.
    pub fn new(address: impl Into<Principal>, deployer: impl Into<Principal>) -> Self {
        Self {
            address: address.into(),
            deployer: deployer.into(),
            governor: None,
            allowed_invokers: BTreeSet::new(),
            ledger: AssetLedger::new(),
            disbursements: Vec::new(),
        }
    }

    pub fn address(&self) -> &Principal {
        &self.address
    }

    pub fn governor(&self) -> Option<&Principal> {
        self.governor.as_ref()
    }

    /// One-time setup: record the governor and allow (or not) the first adapter.
    pub fn init(
        &mut self,
        caller: &Principal,
        governor: Principal,
        invoker: Principal,
        enabled: bool,
    ) -> Result<bool> {
        if caller != &self.deployer {
            warn!("vault init rejected: {} is not the deployer", caller);
            return Err(TreasuryError::Unauthorized(caller.clone()));
        }
        if self.governor.is_some() {
            return Err(TreasuryError::AlreadyInitialized);
        }

        info!("vault {} governed by {}", self.address, governor);
        self.governor = Some(governor);
        self.apply_invoker(invoker, enabled);
        Ok(true)
    }

    /// Allow or revoke an adapter. Callable by the deployer or the governor.
    pub fn set_allowed_invoker(
        &mut self,
        caller: &Principal,
        invoker: Principal,
        enabled: bool,
    ) -> Result<bool> {
        let is_governor = self.governor.as_ref() == Some(caller);
        if caller != &self.deployer && !is_governor {
            warn!("set-allowed-invoker rejected for {}", caller);
            return Err(TreasuryError::Unauthorized(caller.clone()));
        }
        self.apply_invoker(invoker, enabled);
        Ok(true)
    }

    fn apply_invoker(&mut self, invoker: Principal, enabled: bool) {
        if enabled {
            info!("vault invoker allowed: {}", invoker);
            self.allowed_invokers.insert(invoker);
        } else {
            info!("vault invoker revoked: {}", invoker);
            self.allowed_invokers.remove(&invoker);
        }
    }

    pub fn is_allowed_invoker(&self, invoker: &Principal) -> bool {
        self.allowed_invokers.contains(invoker)
    }

    /// Fund the vault.
    pub fn deposit(&mut self, asset: &Asset, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount("deposit must be positive".to_string()));
        }
        self.ledger.credit(asset, &self.address, amount)
    }

    /// The only outbound path. Debits the vault and credits `recipient`
    /// atomically.
    pub fn transfer(
        &mut self,
        invoker: &Principal,
        asset: &Asset,
        amount: u64,
        recipient: &Principal,
    ) -> Result<bool> {
        if !self.is_allowed_invoker(invoker) {
            warn!("vault transfer rejected: {} is not an allowed invoker", invoker);
            return Err(TreasuryError::Unauthorized(invoker.clone()));
        }
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount("transfer must be positive".to_string()));
        }

        self.ledger.transfer(asset, &self.address, recipient, amount)?;
        info!("vault paid {} {} to {} via {}", amount, asset, recipient, invoker);
        self.disbursements.push(Disbursement {
            invoker: invoker.clone(),
            asset: asset.clone(),
            amount,
            recipient: recipient.clone(),
        });
        Ok(true)
    }

    /// Vault holdings of `asset`.
    pub fn balance(&self, asset: &Asset) -> u64 {
        self.ledger.balance_of(asset, &self.address)
    }

    /// Any account's holdings, e.g. a recipient after execution.
    pub fn balance_of(&self, asset: &Asset, who: &Principal) -> u64 {
        self.ledger.balance_of(asset, who)
    }

    pub fn disbursements(&self) -> &[Disbursement] {
        &self.disbursements
    }
}
