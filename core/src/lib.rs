//! Civitas Core Library
//!
//! Shared vocabulary for the governance engine and the treasury: identities,
//! heights, adapter fingerprints, transfer payloads and vote choices.

pub mod error;
pub mod fingerprint;
pub mod payload;
pub mod principal;
pub mod vote;

// Re-export main types
pub use error::{CoreError, ErrorKind, Result};
pub use fingerprint::Fingerprint;
pub use payload::{Memo, Payload, TransferKind, MAX_MEMO_LEN};
pub use principal::Principal;
pub use vote::VoteChoice;

/// Discrete ledger time unit. The engine reads it, never advances it.
pub type Height = u64;

/// Proposal identifiers start at 1 and only ever increase.
pub type ProposalId = u64;
