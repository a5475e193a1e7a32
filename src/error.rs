//! Error types for safe-protocol

use alloy::primitives::Address;
use thiserror::Error;

use crate::chain::ContractKind;
use crate::signing::SignatureKind;
use crate::version::SafeVersion;

/// Result type alias for safe-protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building, signing or submitting Safe transactions
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input rejected before any computation
    #[error("Invalid {what}: {reason}")]
    InvalidParameter { what: &'static str, reason: String },

    /// Signature bytes could not be decoded or packed
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// The method does not exist on the resolved contract version
    #[error("Method {method} is not supported by {contract} v{version}")]
    UnsupportedMethod {
        method: String,
        contract: ContractKind,
        version: SafeVersion,
    },

    /// The signature kind is not accepted by this contract version
    #[error("{kind:?} signatures are not accepted by Safe v{version}")]
    UnsupportedSignature {
        kind: SignatureKind,
        version: SafeVersion,
    },

    /// No address could be resolved for the contract
    #[error("{contract} v{version} is not deployed on chain {chain_id}")]
    ContractNotDeployed {
        contract: ContractKind,
        version: SafeVersion,
        chain_id: u64,
    },

    /// Execution attempted with fewer valid owner signatures than the threshold
    #[error("Threshold not met: {valid} valid owner signatures, {threshold} required")]
    ThresholdNotMet { valid: usize, threshold: usize },

    /// Nested contract signatures are deeper than allowed
    #[error("Contract signature nesting exceeds the maximum depth of {max_depth}")]
    RecursionLimit { max_depth: usize },

    /// The signer is not an owner of the Safe
    #[error("Signer {signer} is not an owner of Safe {safe}")]
    NotOwner { signer: Address, safe: Address },

    /// Failed to connect to the RPC provider
    #[error("Provider error: {0}")]
    Provider(String),

    /// Failed to fetch data from the blockchain
    #[error("Failed to fetch {what}: {reason}")]
    Fetch { what: &'static str, reason: String },

    /// Transaction execution failed
    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },

    /// Signature generation failed
    #[error("Failed to sign: {0}")]
    Signing(String),

    /// ABI encoding/decoding error
    #[error("ABI error: {0}")]
    Abi(String),

    /// EIP-712 typed data error
    #[error("EIP-712 error: {0}")]
    Eip712(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`]
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            what,
            reason: reason.into(),
        }
    }
}

impl From<alloy::transports::RpcError<alloy::transports::TransportErrorKind>> for Error {
    fn from(err: alloy::transports::RpcError<alloy::transports::TransportErrorKind>) -> Self {
        Error::Provider(err.to_string())
    }
}

impl From<alloy::providers::PendingTransactionError> for Error {
    fn from(err: alloy::providers::PendingTransactionError) -> Self {
        Error::ExecutionFailed {
            reason: err.to_string(),
        }
    }
}

impl From<alloy::signers::Error> for Error {
    fn from(err: alloy::signers::Error) -> Self {
        Error::Signing(err.to_string())
    }
}

impl From<alloy::dyn_abi::Error> for Error {
    fn from(err: alloy::dyn_abi::Error) -> Self {
        Error::Abi(err.to_string())
    }
}
