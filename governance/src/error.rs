//! Governance error types

use civitas_core::{ErrorKind, Fingerprint, Height, Principal, ProposalId};
use civitas_treasury::AdapterError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Proposal not found: {0}")]
    ProposalMissing(ProposalId),

    #[error("Voting period still active until height {end_height}")]
    VotingNotOver { end_height: Height },

    #[error("Voting is closed for proposal {0}")]
    VotingClosed(ProposalId),

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Principal },

    #[error("Proposal {0} is already queued")]
    AlreadyQueued(ProposalId),

    #[error("Proposal {0} must be queued before execution")]
    NotQueued(ProposalId),

    #[error("Timelock active until height {eta}")]
    TooEarly { eta: Height },

    #[error("Proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("Proposal {0} has already been cancelled")]
    AlreadyCancelled(ProposalId),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Principal),

    #[error("Proposal {0} did not pass")]
    NotPassed(ProposalId),

    #[error("Adapter {adapter} changed since proposal creation (pinned {pinned})")]
    HashChanged {
        adapter: Principal,
        pinned: Fingerprint,
        live: Option<Fingerprint>,
    },

    #[error("Insufficient voting power: {weight} of {supply} supply, {threshold_percent}% required")]
    InsufficientPower {
        weight: u64,
        supply: u64,
        threshold_percent: u64,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid governance parameter: {0}")]
    InvalidParameter(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(Principal),

    #[error("Invalid vote choice: {0}")]
    InvalidChoice(u8),

    #[error("Adapter failure: {0}")]
    Adapter(#[from] AdapterError),
}

impl GovernanceError {
    /// Stable numeric code, matching the deployed contract error codes.
    pub fn code(&self) -> u32 {
        match self {
            GovernanceError::ProposalMissing(_) => 102,
            GovernanceError::VotingNotOver { .. } => 103,
            GovernanceError::VotingClosed(_) => 104,
            GovernanceError::AlreadyVoted { .. } => 105,
            GovernanceError::AlreadyQueued(_) => 106,
            GovernanceError::NotQueued(_) => 107,
            GovernanceError::TooEarly { .. } => 108,
            GovernanceError::AlreadyExecuted(_) => 109,
            GovernanceError::AlreadyCancelled(_) => 110,
            GovernanceError::InvalidRecipient(_) => 111,
            GovernanceError::NotPassed(_) => 112,
            GovernanceError::HashChanged { .. } => 113,
            GovernanceError::InsufficientPower { .. } => 114,
            GovernanceError::InvalidPayload(_) => 115,
            GovernanceError::InvalidParameter(_) => 116,
            GovernanceError::Unauthorized(_) => 117,
            GovernanceError::InvalidChoice(_) => 118,
            GovernanceError::Adapter(inner) => inner.code(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::ProposalMissing(_) => ErrorKind::NotFound,
            GovernanceError::VotingNotOver { .. }
            | GovernanceError::VotingClosed(_)
            | GovernanceError::TooEarly { .. } => ErrorKind::TimingViolation,
            GovernanceError::AlreadyVoted { .. }
            | GovernanceError::AlreadyQueued(_)
            | GovernanceError::NotQueued(_)
            | GovernanceError::AlreadyExecuted(_)
            | GovernanceError::AlreadyCancelled(_)
            | GovernanceError::NotPassed(_) => ErrorKind::StateConflict,
            GovernanceError::InsufficientPower { .. } | GovernanceError::Unauthorized(_) => {
                ErrorKind::AuthorizationFailure
            }
            GovernanceError::InvalidRecipient(_)
            | GovernanceError::InvalidPayload(_)
            | GovernanceError::InvalidParameter(_)
            | GovernanceError::InvalidChoice(_) => ErrorKind::ValidationFailure,
            GovernanceError::HashChanged { .. } => ErrorKind::IntegrityFailure,
            GovernanceError::Adapter(inner) => inner.kind(),
        }
    }

    /// The adapter a proposal was pinned to has been tampered with. Clients
    /// should flag the adapter rather than retry.
    pub fn is_integrity_failure(&self) -> bool {
        self.kind() == ErrorKind::IntegrityFailure
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
