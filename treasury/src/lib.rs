//! Civitas Treasury Module
//!
//! Holds the community funds and the execution adapters that are allowed to
//! move them:
//! - the vault only pays out on behalf of allowed adapters
//! - adapters only dispatch for the governance core they are bound to
//! - adapter logic is fingerprinted so upgrades are detectable
//!
//! Funds are distributed through executed governance proposals.

pub mod adapter;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod transfer;
pub mod vault;

pub use adapter::{Adapter, AdapterDescriptor, AdapterLogic, DispatchCall};
pub use directory::AdapterDirectory;
pub use error::{AdapterError, Result, TreasuryError};
pub use ledger::{Asset, AssetLedger};
pub use transfer::{TransferLogic, TRANSFER_ADAPTER_NAME};
pub use vault::{Disbursement, TreasuryVault};
