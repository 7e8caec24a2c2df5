//! Ballot choices and their wire encoding

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Ballot options. The numeric values are the wire encoding clients submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for VoteChoice {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteChoice::Against),
            1 => Ok(VoteChoice::For),
            2 => Ok(VoteChoice::Abstain),
            other => Err(CoreError::InvalidChoice(other)),
        }
    }
}

impl From<VoteChoice> for u8 {
    fn from(choice: VoteChoice) -> Self {
        choice as u8
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoteChoice::Against => "against",
            VoteChoice::For => "for",
            VoteChoice::Abstain => "abstain",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_encoding() {
        assert_eq!(VoteChoice::try_from(0).unwrap(), VoteChoice::Against);
        assert_eq!(VoteChoice::try_from(1).unwrap(), VoteChoice::For);
        assert_eq!(VoteChoice::try_from(2).unwrap(), VoteChoice::Abstain);
        assert_eq!(VoteChoice::try_from(3), Err(CoreError::InvalidChoice(3)));
        assert_eq!(u8::from(VoteChoice::Abstain), 2);
    }
}
