//! Building, signing and packing Safe transactions
//!
//! A [`SafeTransaction`] is hashed once at build time and never changes
//! afterwards; only its signature aggregate grows. Owner membership is checked
//! against the [`SafeAccountState`] passed in at execution time, so signatures
//! from owners removed since signing stop counting.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::chain::ContractKind;
use crate::config::validate_owners;
use crate::contracts::ContractAdapter;
use crate::encoding::{encode_multisend_data, hash_transaction, SafeDomain, SafeTxParams};
use crate::error::{Error, Result};
use crate::signing::{
    check_signature_kind, verify_signature, SafeSignature, SignatureAggregate, SignatureKind,
};
use crate::types::{Call, Operation};
use crate::version::SafeVersion;

/// Snapshot of a deployed (or predicted) Safe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeAccountState {
    address: Address,
    chain_id: u64,
    version: SafeVersion,
    owners: Vec<Address>,
    threshold: u64,
    nonce: U256,
    singleton: Option<Address>,
    fallback_handler: Option<Address>,
}

impl SafeAccountState {
    /// Creates a snapshot, rejecting empty or duplicated owners and out of
    /// range thresholds
    pub fn new(
        address: Address,
        chain_id: u64,
        version: SafeVersion,
        owners: Vec<Address>,
        threshold: u64,
        nonce: U256,
    ) -> Result<Self> {
        validate_owners(&owners, threshold)?;
        Ok(Self {
            address,
            chain_id,
            version,
            owners,
            threshold,
            nonce,
            singleton: None,
            fallback_handler: None,
        })
    }

    pub fn with_singleton(mut self, singleton: Address) -> Self {
        self.singleton = Some(singleton);
        self
    }

    pub fn with_fallback_handler(mut self, handler: Address) -> Self {
        self.fallback_handler = Some(handler);
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn version(&self) -> SafeVersion {
        self.version
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn singleton(&self) -> Option<Address> {
        self.singleton
    }

    pub fn fallback_handler(&self) -> Option<Address> {
        self.fallback_handler
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// The EIP-712 domain of this Safe
    pub fn domain(&self) -> SafeDomain {
        SafeDomain::new(self.chain_id, self.address, self.version)
    }

    /// Replaces the owner set, as after `addOwnerWithThreshold`, `removeOwner`
    /// or `swapOwner`
    pub fn update_owners(&mut self, owners: Vec<Address>, threshold: u64) -> Result<()> {
        validate_owners(&owners, threshold)?;
        self.owners = owners;
        self.threshold = threshold;
        Ok(())
    }

    /// Drops `owner` and sets the new threshold, as `removeOwner` does
    pub fn remove_owner(&mut self, owner: Address, threshold: u64) -> Result<()> {
        if !self.is_owner(&owner) {
            return Err(Error::NotOwner {
                signer: owner,
                safe: self.address,
            });
        }
        let owners = self.owners.iter().copied().filter(|o| *o != owner).collect();
        self.update_owners(owners, threshold)
    }

    /// Records a successful execution
    pub fn increment_nonce(&mut self) {
        self.nonce += U256::from(1);
    }
}

/// Caller-supplied transaction fields; omitted gas fields default to zero and
/// an omitted nonce to the account's current nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransactionRequest {
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_tx_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

impl SafeTransactionRequest {
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value,
            data: data.into(),
            operation: Operation::Call,
            safe_tx_gas: None,
            base_gas: None,
            gas_price: None,
            gas_token: None,
            refund_receiver: None,
            nonce: None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_safe_tx_gas(mut self, gas: U256) -> Self {
        self.safe_tx_gas = Some(gas);
        self
    }

    /// Sets the refund parameters paid out of the Safe
    pub fn with_refund(
        mut self,
        base_gas: U256,
        gas_price: U256,
        gas_token: Address,
        refund_receiver: Address,
    ) -> Self {
        self.base_gas = Some(base_gas);
        self.gas_price = Some(gas_price);
        self.gas_token = Some(gas_token);
        self.refund_receiver = Some(refund_receiver);
        self
    }
}

impl From<Call> for SafeTransactionRequest {
    fn from(call: Call) -> Self {
        Self::new(call.to, call.value, call.data).with_operation(call.operation)
    }
}

/// A hashed Safe transaction and the signatures collected for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    domain: SafeDomain,
    params: SafeTxParams,
    hash: B256,
    signatures: SignatureAggregate,
}

impl SafeTransaction {
    /// Hashes `params` in `domain`
    pub fn new(domain: SafeDomain, params: SafeTxParams) -> Self {
        let hash = hash_transaction(&domain, &params);
        Self {
            domain,
            params,
            hash,
            signatures: SignatureAggregate::new(),
        }
    }

    pub fn params(&self) -> &SafeTxParams {
        &self.params
    }

    pub fn domain(&self) -> &SafeDomain {
        &self.domain
    }

    /// The EIP-712 hash owners sign
    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn signatures(&self) -> &SignatureAggregate {
        &self.signatures
    }

    /// Adds raw signature bytes from `signer`
    ///
    /// ECDSA signatures must recover to `signer`. A signature from the same
    /// signer replaces the previous one.
    pub fn add_signature(
        &mut self,
        signer: Address,
        signature: impl Into<Bytes>,
        kind: SignatureKind,
    ) -> Result<()> {
        let signature = SafeSignature::new(signer, signature, kind)?;
        self.add_signed(signature)
    }

    /// Adds a signature produced by [`crate::signing::sign_hash`] or built elsewhere
    ///
    /// eth_sign signatures are refused on versions that cannot verify them.
    pub fn add_signed(&mut self, signature: SafeSignature) -> Result<()> {
        check_signature_kind(self.domain.version, &signature)?;
        verify_signature(self.hash, &signature)?;
        self.signatures.insert(signature);
        Ok(())
    }

    /// Adds an approved-hash signature for `owner`
    pub fn add_pre_validated(&mut self, owner: Address) {
        self.signatures.insert(SafeSignature::pre_validated(owner));
    }

    pub fn remove_signature(&mut self, signer: &Address) -> Option<SafeSignature> {
        self.signatures.remove(signer)
    }

    /// Merges signatures collected elsewhere for the same hash
    pub fn merge_signatures(&mut self, signatures: SignatureAggregate) -> Result<()> {
        for signature in signatures.iter() {
            check_signature_kind(self.domain.version, signature)?;
            verify_signature(self.hash, signature)?;
        }
        self.signatures.merge(signatures);
        Ok(())
    }

    /// All collected signatures, packed
    pub fn encoded_signatures(&self) -> Bytes {
        self.signatures.encode()
    }

    /// Number of collected signatures from current owners of `account`
    pub fn valid_signature_count(&self, account: &SafeAccountState) -> usize {
        self.signatures
            .signers()
            .filter(|signer| account.is_owner(signer))
            .count()
    }

    /// True when current owners have signed at least `threshold` times
    pub fn is_ready_to_execute(&self, account: &SafeAccountState) -> bool {
        self.valid_signature_count(account) as u64 >= account.threshold()
    }

    /// Encodes `execTransaction` with the packed owner signatures
    ///
    /// Signatures from addresses that are no longer owners are left out of the
    /// blob, since the contract would reject it.
    pub fn to_executable_call_data(
        &self,
        account: &SafeAccountState,
        safe: &ContractAdapter,
    ) -> Result<Bytes> {
        if account.address() != self.domain.verifying_contract {
            return Err(Error::invalid(
                "account",
                format!(
                    "transaction was built for {}, not {}",
                    self.domain.verifying_contract,
                    account.address()
                ),
            ));
        }
        if safe.kind() != ContractKind::Safe {
            return Err(Error::invalid("contract", format!("expected Safe, got {}", safe.kind())));
        }

        let signatures = owner_signatures(&self.signatures, account);
        if (signatures.len() as u64) < account.threshold() {
            return Err(Error::ThresholdNotMet {
                valid: signatures.len(),
                threshold: account.threshold() as usize,
            });
        }

        let params = &self.params;
        safe.encode(
            "execTransaction",
            &[
                DynSolValue::Address(params.to),
                DynSolValue::Uint(params.value, 256),
                DynSolValue::Bytes(params.data.to_vec()),
                DynSolValue::Uint(U256::from(params.operation.as_u8()), 8),
                DynSolValue::Uint(params.safe_tx_gas, 256),
                DynSolValue::Uint(params.base_gas, 256),
                DynSolValue::Uint(params.gas_price, 256),
                DynSolValue::Address(params.gas_token),
                DynSolValue::Address(params.refund_receiver),
                DynSolValue::Bytes(signatures.encode().to_vec()),
            ],
        )
    }
}

/// Keeps only signatures from current owners of `account`
pub(crate) fn owner_signatures(
    signatures: &SignatureAggregate,
    account: &SafeAccountState,
) -> SignatureAggregate {
    signatures
        .iter()
        .filter(|signature| {
            let owner = account.is_owner(&signature.signer());
            if !owner {
                tracing::warn!(
                    signer = %signature.signer(),
                    safe = %account.address(),
                    "dropping signature from non-owner"
                );
            }
            owner
        })
        .cloned()
        .collect()
}

/// Builds transactions for one Safe
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder<'a> {
    account: &'a SafeAccountState,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(account: &'a SafeAccountState) -> Self {
        Self { account }
    }

    /// Fills defaults and hashes the transaction
    pub fn build(&self, request: SafeTransactionRequest) -> SafeTransaction {
        let params = SafeTxParams {
            to: request.to,
            value: request.value,
            data: request.data,
            operation: request.operation,
            safe_tx_gas: request.safe_tx_gas.unwrap_or_default(),
            base_gas: request.base_gas.unwrap_or_default(),
            gas_price: request.gas_price.unwrap_or_default(),
            gas_token: request.gas_token.unwrap_or_default(),
            refund_receiver: request.refund_receiver.unwrap_or_default(),
            nonce: request.nonce.unwrap_or(self.account.nonce()),
        };

        SafeTransaction::new(self.account.domain(), params)
    }

    /// Builds one transaction out of several calls
    ///
    /// A single call is sent as is. Several calls become a delegate call to
    /// `multi_send` carrying the packed batch. MultiSendCallOnly rejects
    /// delegate calls inside the batch.
    pub fn build_batch(&self, calls: &[Call], multi_send: &ContractAdapter) -> Result<SafeTransaction> {
        match calls {
            [] => Err(Error::invalid("calls", "batch is empty")),
            [call] => Ok(self.build(call.clone().into())),
            _ => {
                match multi_send.kind() {
                    ContractKind::MultiSend => {}
                    ContractKind::MultiSendCallOnly => {
                        if calls.iter().any(|c| c.operation == Operation::DelegateCall) {
                            return Err(Error::invalid(
                                "calls",
                                "MultiSendCallOnly cannot run delegate calls",
                            ));
                        }
                    }
                    other => {
                        return Err(Error::invalid(
                            "contract",
                            format!("expected MultiSend, got {other}"),
                        ))
                    }
                }

                let transactions = encode_multisend_data(calls);
                let data =
                    multi_send.encode("multiSend", &[DynSolValue::Bytes(transactions.to_vec())])?;

                // MultiSend is called with zero value; individual call values are encoded in the data
                let request = SafeTransactionRequest::new(multi_send.address(), U256::ZERO, data)
                    .with_operation(Operation::DelegateCall);
                Ok(self.build(request))
            }
        }
    }
}
