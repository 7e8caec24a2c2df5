//! Treasury and adapter error types

use civitas_core::{ErrorKind, Principal};
use thiserror::Error;

/// Vault errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Unauthorized treasury call from {0}")]
    Unauthorized(Principal),

    #[error("Insufficient treasury balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Treasury already initialized")]
    AlreadyInitialized,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Balance overflow crediting {0}")]
    BalanceOverflow(Principal),
}

impl TreasuryError {
    /// Stable numeric code reported to clients.
    pub fn code(&self) -> u32 {
        match self {
            TreasuryError::Unauthorized(_) => 101,
            TreasuryError::InsufficientBalance { .. } => 120,
            TreasuryError::AlreadyInitialized => 121,
            TreasuryError::InvalidAmount(_) => 122,
            TreasuryError::BalanceOverflow(_) => 123,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TreasuryError::Unauthorized(_) => ErrorKind::AuthorizationFailure,
            TreasuryError::AlreadyInitialized => ErrorKind::StateConflict,
            TreasuryError::InsufficientBalance { .. }
            | TreasuryError::InvalidAmount(_)
            | TreasuryError::BalanceOverflow(_) => ErrorKind::ValidationFailure,
        }
    }
}

/// Execution adapter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Adapter has no governance core bound")]
    DaoNotSet,

    #[error("Unauthorized adapter call from {0}")]
    Unauthorized(Principal),

    #[error("Invalid transfer kind: {0}")]
    InvalidKind(String),

    #[error("Token reference required for token transfer")]
    TokenExpected,

    #[error("Unknown adapter: {0}")]
    UnknownAdapter(Principal),

    #[error("Adapter already deployed: {0}")]
    AlreadyDeployed(Principal),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),
}

impl AdapterError {
    pub fn code(&self) -> u32 {
        match self {
            AdapterError::DaoNotSet => 100,
            AdapterError::Unauthorized(_) => 101,
            AdapterError::InvalidKind(_) => 102,
            AdapterError::TokenExpected => 103,
            AdapterError::UnknownAdapter(_) => 104,
            AdapterError::AlreadyDeployed(_) => 105,
            AdapterError::Treasury(inner) => inner.code(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::DaoNotSet | AdapterError::Unauthorized(_) => {
                ErrorKind::AuthorizationFailure
            }
            AdapterError::InvalidKind(_)
            | AdapterError::TokenExpected
            | AdapterError::UnknownAdapter(_) => ErrorKind::ValidationFailure,
            AdapterError::AlreadyDeployed(_) => ErrorKind::StateConflict,
            AdapterError::Treasury(inner) => inner.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
