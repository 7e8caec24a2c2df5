//! Civitas Governance Module
//!
//! On-ledger proposal lifecycle for a community treasury:
//! - token-weighted voting with one-hop delegation
//! - quorum and strict-majority tallying against a supply snapshot
//! - timelocked execution through fingerprint-pinned adapters

pub mod clock;
pub mod delegation;
pub mod error;
pub mod params;
pub mod power;
pub mod proposal;
pub mod registry;
pub mod store;
pub mod tally;

pub use clock::{Clock, ManualClock};
pub use delegation::DelegationRegistry;
pub use error::{GovernanceError, Result};
pub use params::GovernanceParameters;
pub use power::{BalanceSnapshots, VotingPowerSource};
pub use proposal::{AdapterPin, Proposal, ProposalStatus};
pub use registry::{CancelPolicy, GovernanceStats, Governor, GovernorConfig};
pub use store::{GovernanceStore, InMemoryStore};
pub use tally::{proposal_passes, ProposalStats, Tally};
