//! # safe-protocol
//!
//! Protocol-level building blocks for Safe smart accounts, versions 1.0.0 to 1.4.1.
//!
//! ## Features
//!
//! - CREATE2 address prediction for new Safe proxies
//! - EIP-712 hashing of Safe transactions and messages, gated per contract version
//! - Signature collection and packing (ECDSA, eth_sign, ERC-1271, approved hash)
//! - A single contract adapter over the per-version ABIs, driven by an injected
//!   deployment registry
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use safe_protocol::{
//!     sign_hash, ContractAdapter, ContractKind, SafeAccountState, SafeTransactionRequest,
//!     SafeVersion, SigningMethod, StaticRegistry, TransactionBuilder,
//! };
//!
//! let account = SafeAccountState::new(safe, 1, SafeVersion::V1_4_1, owners, 2, nonce)?;
//! let mut tx = TransactionBuilder::new(&account)
//!     .build(SafeTransactionRequest::new(token, U256::ZERO, transfer_data));
//!
//! // Each owner signs the hash off-chain
//! tx.add_signed(sign_hash(&owner_a, tx.hash(), SigningMethod::TypedData).await?)?;
//! tx.add_signed(sign_hash(&owner_b, tx.hash(), SigningMethod::EthSign).await?)?;
//!
//! // Owners are checked again against the account state at execution time
//! let safe_contract = ContractAdapter::resolve(
//!     ContractKind::Safe,
//!     SafeVersion::V1_4_1,
//!     1,
//!     &StaticRegistry::canonical(),
//! )?;
//! let call_data = tx.to_executable_call_data(&account, &safe_contract)?;
//! ```
//!
//! ## Predicting a deployment
//!
//! ```rust,ignore
//! let params = deployment_params(&registry, chain_id, &account_config, &deployment_config)?;
//! let address = predict_safe_address(&params, &creation_code);
//! ```

pub mod chain;
pub mod config;
pub mod contracts;
pub mod create2;
pub mod encoding;
pub mod error;
pub mod message;
pub mod safe;
pub mod signing;
pub mod transaction;
pub mod transport;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use chain::{chain_ids, ChainAddresses, ContractKind, Deployment, DeploymentRegistry, StaticRegistry};
pub use config::{SafeAccountConfig, SafeDeploymentConfig};
pub use contracts::{
    AbiSource, ContractAdapter, IERC20, IMultiSend, IMultiSendCallOnly, ISafe, ISafeProxyFactory,
    ISafeSetup, UnresolvedContract, WriteOutcome,
};
pub use create2::{
    compute_create2_address, deployment_params, encode_create_proxy_with_nonce, encode_setup_call,
    predict_deployment_address, predict_safe_address, DeploymentParams,
};
pub use encoding::{hash_message, hash_transaction, MessagePayload, SafeDomain, SafeTxParams};
pub use error::{Error, Result};
pub use message::SafeMessage;
pub use safe::Safe;
pub use signing::{
    build_contract_signature, decode_signatures, encode_signatures, sign_hash, SafeSignature,
    SignatureAggregate, SignatureKind, SignatureNode, SigningMethod,
};
pub use transaction::{SafeAccountState, SafeTransaction, SafeTransactionRequest, TransactionBuilder};
pub use transport::{ExecutionResult, RpcTransport, Transport};
pub use types::{Call, Operation, SafeCall, TypedCall};
pub use version::{SafeFeature, SafeVersion};

// Re-export alloy types that are commonly used
pub use alloy::network::AnyNetwork;
pub use alloy::primitives::{Address, Bytes, B256, U256};
pub use alloy::providers::Provider;
