//! Adapter directory
//!
//! Resolves adapter addresses to the adapter deployed there. Lookups are
//! always live: callers that need integrity re-hash what they resolve instead
//! of caching a handle.

use civitas_core::{Fingerprint, Principal};
use log::info;
use std::collections::BTreeMap;

use crate::adapter::{Adapter, DispatchCall};
use crate::error::AdapterError;
use crate::vault::TreasuryVault;

#[derive(Debug, Default)]
pub struct AdapterDirectory {
    adapters: BTreeMap<Principal, Adapter>,
}

impl AdapterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an adapter at its address. Addresses are never reused.
    pub fn deploy(&mut self, adapter: Adapter) -> Result<Fingerprint, AdapterError> {
        if self.adapters.contains_key(adapter.address()) {
            return Err(AdapterError::AlreadyDeployed(adapter.address().clone()));
        }
        let fingerprint = adapter.fingerprint();
        info!(
            "deployed adapter {} ({}, {})",
            adapter.address(),
            adapter.descriptor(),
            fingerprint.short()
        );
        self.adapters.insert(adapter.address().clone(), adapter);
        Ok(fingerprint)
    }

    pub fn get(&self, address: &Principal) -> Option<&Adapter> {
        self.adapters.get(address)
    }

    pub fn get_mut(&mut self, address: &Principal) -> Option<&mut Adapter> {
        self.adapters.get_mut(address)
    }

    /// Live fingerprint of whatever is deployed at `address`.
    pub fn fingerprint(&self, address: &Principal) -> Option<Fingerprint> {
        self.adapters.get(address).map(Adapter::fingerprint)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Principal> {
        self.adapters.keys()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn dispatch(
        &self,
        address: &Principal,
        caller: &Principal,
        call: &DispatchCall<'_>,
        vault: &mut TreasuryVault,
    ) -> Result<bool, AdapterError> {
        let adapter = self
            .adapters
            .get(address)
            .ok_or_else(|| AdapterError::UnknownAdapter(address.clone()))?;
        adapter.dispatch(caller, call, vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::TransferLogic;

    #[test]
    fn test_deploy_and_resolve() {
        let mut directory = AdapterDirectory::new();
        let fp = directory
            .deploy(Adapter::new("deployer.transfer-adapter-v1", "deployer", Box::new(TransferLogic::default())))
            .unwrap();

        let address = Principal::from("deployer.transfer-adapter-v1");
        assert_eq!(directory.fingerprint(&address), Some(fp));
        assert_eq!(directory.fingerprint(&Principal::from("nowhere")), None);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_address_cannot_be_redeployed() {
        let mut directory = AdapterDirectory::new();
        directory
            .deploy(Adapter::new("a", "deployer", Box::new(TransferLogic::default())))
            .unwrap();
        let err = directory
            .deploy(Adapter::new("a", "deployer", Box::new(TransferLogic::new(2))))
            .unwrap_err();
        assert_eq!(err, AdapterError::AlreadyDeployed(Principal::from("a")));
    }

    #[test]
    fn test_upgrade_changes_live_fingerprint() {
        let mut directory = AdapterDirectory::new();
        let address = Principal::from("a");
        let before = directory
            .deploy(Adapter::new("a", "deployer", Box::new(TransferLogic::default())))
            .unwrap();

        let adapter = directory.get_mut(&address).unwrap();
        adapter
            .upgrade(&Principal::from("deployer"), Box::new(TransferLogic::new(2)))
            .unwrap();
        assert_ne!(directory.fingerprint(&address), Some(before));
    }
}
