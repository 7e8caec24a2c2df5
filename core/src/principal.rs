//! Ledger identities
//!
//! A principal names anything that can act or be acted upon: voters,
//! proposers, the registry itself, adapters, tokens and the vault. The
//! hosting runtime authenticates callers, so here it is just an opaque,
//! non-empty name such as `ST1PQ...GM` or `ST1PQ...GM.transfer-adapter-v1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Contract-style principals carry a `.name` suffix after the deployer.
    pub fn is_contract(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoreError::EmptyPrincipal);
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Principal {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
