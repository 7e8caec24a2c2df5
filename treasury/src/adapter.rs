//! Execution adapters
//!
//! An adapter translates a proposal payload into a concrete vault transfer.
//! Its logic is content-addressed: the fingerprint is a hash of the logic's
//! canonical descriptor, so replacing the logic (an upgrade) changes the
//! fingerprint and a proposal pinned to the old one can no longer execute.

use civitas_core::{Fingerprint, Payload, Principal, ProposalId, TransferKind};
use log::{debug, info, warn};
use std::fmt;

use crate::error::AdapterError;
use crate::vault::TreasuryVault;

/// Canonical definition of a piece of adapter logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub name: String,
    pub version: u32,
    pub kinds: Vec<TransferKind>,
}

impl AdapterDescriptor {
    /// Stable byte encoding hashed into the fingerprint.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let kinds: Vec<&str> = self.kinds.iter().map(|k| k.as_str()).collect();
        format!("{}:v{}:{}", self.name, self.version, kinds.join(",")).into_bytes()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.canonical_bytes())
    }

    pub fn supports(&self, kind: TransferKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl fmt::Display for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Arguments of one execution request.
#[derive(Debug, Clone, Copy)]
pub struct DispatchCall<'a> {
    pub proposal_id: ProposalId,
    pub payload: &'a Payload,
    /// Token the executor supplied. Must equal `payload.token` for token transfers.
    pub token_ref: &'a Principal,
}

/// Pluggable executable logic behind an adapter address.
pub trait AdapterLogic: Send + Sync {
    fn descriptor(&self) -> AdapterDescriptor;

    /// Carry out the transfer. `invoker` is the adapter's own address, which
    /// the vault checks against its allow-list.
    fn execute(
        &self,
        invoker: &Principal,
        call: &DispatchCall<'_>,
        vault: &mut TreasuryVault,
    ) -> Result<(), AdapterError>;
}

/// A deployed adapter: an address, its administrative bindings and the
/// logic currently installed there.
pub struct Adapter {
    address: Principal,
    owner: Principal,
    core: Option<Principal>,
    logic: Box<dyn AdapterLogic>,
}

impl Adapter {
    pub fn new(
        address: impl Into<Principal>,
        owner: impl Into<Principal>,
        logic: Box<dyn AdapterLogic>,
    ) -> Self {
        Self {
            address: address.into(),
            owner: owner.into(),
            core: None,
            logic,
        }
    }

    pub fn address(&self) -> &Principal {
        &self.address
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn core(&self) -> Option<&Principal> {
        self.core.as_ref()
    }

    pub fn descriptor(&self) -> AdapterDescriptor {
        self.logic.descriptor()
    }

    /// Hash of the logic installed right now.
    pub fn fingerprint(&self) -> Fingerprint {
        self.logic.descriptor().fingerprint()
    }

    fn require_owner(&self, caller: &Principal) -> Result<(), AdapterError> {
        if caller != &self.owner {
            warn!("adapter {}: {} is not the owner", self.address, caller);
            return Err(AdapterError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    /// Bind the governance registry allowed to dispatch through this adapter.
    pub fn set_core(&mut self, caller: &Principal, core: Principal) -> Result<bool, AdapterError> {
        self.require_owner(caller)?;
        info!("adapter {} bound to core {}", self.address, core);
        self.core = Some(core);
        Ok(true)
    }

    pub fn set_owner(&mut self, caller: &Principal, owner: Principal) -> Result<bool, AdapterError> {
        self.require_owner(caller)?;
        info!("adapter {} ownership moved to {}", self.address, owner);
        self.owner = owner;
        Ok(true)
    }

    /// Install new logic at the same address. Returns the new fingerprint.
    pub fn upgrade(
        &mut self,
        caller: &Principal,
        logic: Box<dyn AdapterLogic>,
    ) -> Result<Fingerprint, AdapterError> {
        self.require_owner(caller)?;
        let before = self.fingerprint();
        self.logic = logic;
        let after = self.fingerprint();
        info!(
            "adapter {} upgraded to {} ({} -> {})",
            self.address,
            self.logic.descriptor(),
            before.short(),
            after.short()
        );
        Ok(after)
    }

    /// Entry point used by the governance execute path.
    pub fn dispatch(
        &self,
        caller: &Principal,
        call: &DispatchCall<'_>,
        vault: &mut TreasuryVault,
    ) -> Result<bool, AdapterError> {
        let core = self.core.as_ref().ok_or(AdapterError::DaoNotSet)?;
        if caller != core {
            warn!("adapter {}: direct call from {} rejected", self.address, caller);
            return Err(AdapterError::Unauthorized(caller.clone()));
        }

        debug!(
            "adapter {} dispatching proposal {} ({})",
            self.address, call.proposal_id, call.payload.kind
        );
        self.logic.execute(&self.address, call, vault)?;
        Ok(true)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("core", &self.core)
            .field("logic", &self.logic.descriptor())
            .finish()
    }
}
