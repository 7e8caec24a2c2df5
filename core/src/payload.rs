//! Transfer payloads carried by proposals
//!
//! A payload is the tagged union the treasury knows how to execute. The kind
//! is a closed enum so that both the proposal-time validation and the
//! adapter-side dispatch have to match on every variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::principal::Principal;

/// Maximum memo length in bytes (same bound as a native transfer memo).
pub const MAX_MEMO_LEN: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferKind {
    /// Native-unit transfer out of the vault. Carries no token.
    #[serde(alias = "stx-transfer")]
    SimpleTransfer,
    /// Fungible token transfer. Must name the token.
    #[serde(alias = "ft-transfer")]
    TokenTransfer,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::SimpleTransfer => "simple-transfer",
            TransferKind::TokenTransfer => "token-transfer",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple-transfer" | "stx-transfer" => Ok(TransferKind::SimpleTransfer),
            "token-transfer" | "ft-transfer" => Ok(TransferKind::TokenTransfer),
            other => Err(CoreError::UnknownKind(other.to_string())),
        }
    }
}

/// Free-form note attached to a transfer, at most [`MAX_MEMO_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Memo(String);

impl Memo {
    pub fn new(text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        if text.len() > MAX_MEMO_LEN {
            return Err(CoreError::MemoTooLong {
                len: text.len(),
                max: MAX_MEMO_LEN,
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Memo {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Memo::new(value)
    }
}

impl From<Memo> for String {
    fn from(memo: Memo) -> Self {
        memo.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub kind: TransferKind,
    pub amount: u64,
    pub recipient: Principal,
    #[serde(default)]
    pub token: Option<Principal>,
    #[serde(default)]
    pub memo: Option<Memo>,
}

impl Payload {
    /// Native-unit transfer.
    pub fn simple(amount: u64, recipient: impl Into<Principal>) -> Self {
        Self {
            kind: TransferKind::SimpleTransfer,
            amount,
            recipient: recipient.into(),
            token: None,
            memo: None,
        }
    }

    /// Token transfer of `token`.
    pub fn token(amount: u64, recipient: impl Into<Principal>, token: impl Into<Principal>) -> Self {
        Self {
            kind: TransferKind::TokenTransfer,
            amount,
            recipient: recipient.into(),
            token: Some(token.into()),
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: Memo) -> Self {
        self.memo = Some(memo);
        self
    }

    /// Replace the token reference, including clearing it.
    pub fn with_token(mut self, token: Option<Principal>) -> Self {
        self.token = token;
        self
    }

    /// Whether the token field agrees with the kind.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            TransferKind::SimpleTransfer => self.token.is_none(),
            TransferKind::TokenTransfer => self.token.is_some(),
        }
    }
}
