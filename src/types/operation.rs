//! Operation kinds for Safe transactions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the Safe invokes the target of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    /// Regular call (default)
    #[default]
    Call = 0,
    /// Delegate call, executes target code in the Safe's context
    DelegateCall = 1,
}

impl Operation {
    /// Returns the operation as encoded on-chain
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Call => f.write_str("call"),
            Operation::DelegateCall => f.write_str("delegatecall"),
        }
    }
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        op.as_u8()
    }
}

impl TryFrom<u8> for Operation {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(Error::invalid("operation", format!("unknown operation {other}"))),
        }
    }
}
