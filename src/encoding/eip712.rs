//! EIP-712 hashing of Safe transactions and messages
//!
//! The domain layout depends on the Safe version: before 1.3.0 the domain only
//! binds the verifying contract, from 1.3.0 it also binds the chain id.

use alloy::dyn_abi::TypedData;
use alloy::primitives::{eip191_hash_message, keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::contracts::{
    DOMAIN_SEPARATOR_TYPEHASH, DOMAIN_SEPARATOR_TYPEHASH_LEGACY, SAFE_MSG_TYPEHASH,
    SAFE_TX_TYPEHASH,
};
use crate::error::{Error, Result};
use crate::types::Operation;
use crate::version::{SafeFeature, SafeVersion};

/// Safe transaction parameters for hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxParams {
    /// Target address
    pub to: Address,
    /// Value to send
    pub value: U256,
    /// Calldata
    pub data: Bytes,
    /// Operation type
    pub operation: Operation,
    /// Gas limit for the Safe transaction
    pub safe_tx_gas: U256,
    /// Base gas (overhead)
    pub base_gas: U256,
    /// Gas price for refund calculation
    pub gas_price: U256,
    /// Token used for gas refund (address(0) for ETH)
    pub gas_token: Address,
    /// Address to receive gas refund
    pub refund_receiver: Address,
    /// Safe nonce
    pub nonce: U256,
}

impl SafeTxParams {
    /// Creates new SafeTxParams with zeroed gas fields and nonce
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>, operation: Operation) -> Self {
        Self {
            to,
            value,
            data: data.into(),
            operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce: U256::ZERO,
        }
    }

    /// Sets the nonce
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }
}

/// The EIP-712 domain of one Safe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
    pub version: SafeVersion,
}

impl SafeDomain {
    pub fn new(chain_id: u64, verifying_contract: Address, version: SafeVersion) -> Self {
        Self {
            chain_id,
            verifying_contract,
            version,
        }
    }

    /// Computes the domain separator
    ///
    /// ```text
    /// >= 1.3.0: keccak256(abi.encode(DOMAIN_SEPARATOR_TYPEHASH, chainId, safe))
    /// <  1.3.0: keccak256(abi.encode(DOMAIN_SEPARATOR_TYPEHASH_LEGACY, safe))
    /// ```
    pub fn separator(&self) -> B256 {
        let mut encoded = Vec::with_capacity(96);

        if self.version.has_feature(SafeFeature::Eip712ChainId) {
            encoded.extend_from_slice(DOMAIN_SEPARATOR_TYPEHASH.as_slice());
            encoded.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        } else {
            encoded.extend_from_slice(DOMAIN_SEPARATOR_TYPEHASH_LEGACY.as_slice());
        }
        encoded.extend_from_slice(&pad_address(self.verifying_contract));

        keccak256(&encoded)
    }
}

fn pad_address(address: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(address.as_slice());
    padded
}

/// Computes the struct hash for SafeTx
///
/// safeTxHash = keccak256(abi.encode(
///     SAFE_TX_TYPEHASH,
///     to, value, keccak256(data), operation,
///     safeTxGas, baseGas, gasPrice, gasToken, refundReceiver, nonce
/// ))
pub fn compute_safe_tx_hash(params: &SafeTxParams) -> B256 {
    let mut encoded = Vec::with_capacity(352);

    encoded.extend_from_slice(SAFE_TX_TYPEHASH.as_slice());
    encoded.extend_from_slice(&pad_address(params.to));
    encoded.extend_from_slice(&params.value.to_be_bytes::<32>());
    encoded.extend_from_slice(keccak256(&params.data).as_slice());

    let mut op_bytes = [0u8; 32];
    op_bytes[31] = params.operation.as_u8();
    encoded.extend_from_slice(&op_bytes);

    encoded.extend_from_slice(&params.safe_tx_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&params.base_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&params.gas_price.to_be_bytes::<32>());
    encoded.extend_from_slice(&pad_address(params.gas_token));
    encoded.extend_from_slice(&pad_address(params.refund_receiver));
    encoded.extend_from_slice(&params.nonce.to_be_bytes::<32>());

    keccak256(&encoded)
}

/// Builds the 66-byte signing preimage `0x19 0x01 || domainSeparator || structHash`
pub fn encode_typed_preimage(domain_separator: B256, struct_hash: B256) -> Bytes {
    let mut encoded = Vec::with_capacity(66);
    encoded.extend_from_slice(&[0x19, 0x01]);
    encoded.extend_from_slice(domain_separator.as_slice());
    encoded.extend_from_slice(struct_hash.as_slice());
    Bytes::from(encoded)
}

/// Computes the final EIP-712 hash to sign
///
/// hash = keccak256("\x19\x01" || domainSeparator || structHash)
pub fn compute_transaction_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    keccak256(encode_typed_preimage(domain_separator, struct_hash))
}

/// Returns the bytes that `getTransactionHash` hashes (`encodeTransactionData`)
pub fn preimage_safe_transaction_hash(domain: &SafeDomain, params: &SafeTxParams) -> Bytes {
    encode_typed_preimage(domain.separator(), compute_safe_tx_hash(params))
}

/// Computes the Safe transaction hash owners sign
pub fn hash_transaction(domain: &SafeDomain, params: &SafeTxParams) -> B256 {
    compute_transaction_hash(domain.separator(), compute_safe_tx_hash(params))
}

/// Payload of an off-chain Safe message
#[derive(Debug, Clone)]
pub enum MessagePayload {
    /// UTF-8 text, hashed with EIP-191
    Text(String),
    /// Raw bytes, hashed with EIP-191 over the bytes themselves
    Raw(Bytes),
    /// EIP-712 typed data
    TypedData(Box<TypedData>),
}

impl MessagePayload {
    /// Parses an EIP-712 typed data JSON document
    pub fn typed_data_from_json(json: &str) -> Result<Self> {
        let typed: TypedData =
            serde_json::from_str(json).map_err(|e| Error::Eip712(e.to_string()))?;
        Ok(MessagePayload::TypedData(Box::new(typed)))
    }
}

impl From<&str> for MessagePayload {
    fn from(text: &str) -> Self {
        MessagePayload::Text(text.to_string())
    }
}

impl From<String> for MessagePayload {
    fn from(text: String) -> Self {
        MessagePayload::Text(text)
    }
}

impl From<Bytes> for MessagePayload {
    fn from(raw: Bytes) -> Self {
        MessagePayload::Raw(raw)
    }
}

impl From<TypedData> for MessagePayload {
    fn from(typed: TypedData) -> Self {
        MessagePayload::TypedData(Box::new(typed))
    }
}

/// Hashes the payload itself, before Safe domain wrapping
pub fn hash_safe_message(payload: &MessagePayload) -> Result<B256> {
    match payload {
        MessagePayload::Text(text) => Ok(eip191_hash_message(text.as_bytes())),
        MessagePayload::Raw(raw) => Ok(eip191_hash_message(raw)),
        MessagePayload::TypedData(typed) => typed
            .eip712_signing_hash()
            .map_err(|e| Error::Eip712(e.to_string())),
    }
}

/// Computes the SafeMessage struct hash: keccak256(abi.encode(SAFE_MSG_TYPEHASH, keccak256(message)))
pub fn compute_safe_message_struct_hash(message: &[u8]) -> B256 {
    let mut encoded = Vec::with_capacity(64);
    encoded.extend_from_slice(SAFE_MSG_TYPEHASH.as_slice());
    encoded.extend_from_slice(keccak256(message).as_slice());
    keccak256(&encoded)
}

/// Returns the preimage of the Safe message hash
pub fn preimage_safe_message_hash(domain: &SafeDomain, payload: &MessagePayload) -> Result<Bytes> {
    let message_hash = hash_safe_message(payload)?;
    Ok(encode_typed_preimage(
        domain.separator(),
        compute_safe_message_struct_hash(message_hash.as_slice()),
    ))
}

/// Computes the Safe message hash owners sign (`getMessageHashForSafe`)
pub fn hash_message(domain: &SafeDomain, payload: &MessagePayload) -> Result<B256> {
    Ok(keccak256(preimage_safe_message_hash(domain, payload)?))
}
