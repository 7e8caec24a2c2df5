//! Standard transfer adapter logic

use civitas_core::{Principal, TransferKind};
use log::warn;

use crate::adapter::{AdapterDescriptor, AdapterLogic, DispatchCall};
use crate::error::AdapterError;
use crate::ledger::Asset;
use crate::vault::TreasuryVault;

pub const TRANSFER_ADAPTER_NAME: &str = "transfer-adapter";

/// Moves native units or tokens out of the vault exactly as the payload says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLogic {
    version: u32,
    kinds: Vec<TransferKind>,
}

impl TransferLogic {
    /// Supports both payload kinds.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            kinds: vec![TransferKind::SimpleTransfer, TransferKind::TokenTransfer],
        }
    }

    /// Restricted build that only pays out the native unit.
    pub fn native_only(version: u32) -> Self {
        Self {
            version,
            kinds: vec![TransferKind::SimpleTransfer],
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Default for TransferLogic {
    fn default() -> Self {
        Self::new(1)
    }
}

impl AdapterLogic for TransferLogic {
    fn descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor {
            name: TRANSFER_ADAPTER_NAME.to_string(),
            version: self.version,
            kinds: self.kinds.clone(),
        }
    }

    fn execute(
        &self,
        invoker: &Principal,
        call: &DispatchCall<'_>,
        vault: &mut TreasuryVault,
    ) -> Result<(), AdapterError> {
        let payload = call.payload;
        if !self.descriptor().supports(payload.kind) {
            return Err(AdapterError::InvalidKind(format!(
                "{} not supported by {} v{}",
                payload.kind, TRANSFER_ADAPTER_NAME, self.version
            )));
        }

        let asset = match payload.kind {
            TransferKind::SimpleTransfer => Asset::Native,
            TransferKind::TokenTransfer => {
                let token = payload.token.as_ref().ok_or(AdapterError::TokenExpected)?;
                if token != call.token_ref {
                    warn!(
                        "proposal {}: token {} does not match payload token {}",
                        call.proposal_id, call.token_ref, token
                    );
                    return Err(AdapterError::InvalidKind(format!(
                        "token {} does not match payload token {}",
                        call.token_ref, token
                    )));
                }
                Asset::Token(token.clone())
            }
        };

        vault.transfer(invoker, &asset, payload.amount, &payload.recipient)?;
        Ok(())
    }
}
