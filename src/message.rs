//! Off-chain Safe messages (EIP-1271 attestations)

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, B256};

use crate::chain::ContractKind;
use crate::contracts::ContractAdapter;
use crate::encoding::{hash_message, hash_safe_message, MessagePayload, SafeDomain};
use crate::error::{Error, Result};
use crate::signing::{
    check_signature_kind, verify_signature, SafeSignature, SignatureAggregate, SignatureKind,
};
use crate::transaction::{owner_signatures, SafeAccountState};
use crate::types::Call;

/// A message and the owner signatures collected for it
#[derive(Debug, Clone)]
pub struct SafeMessage {
    payload: MessagePayload,
    domain: SafeDomain,
    hash: B256,
    signatures: SignatureAggregate,
}

impl SafeMessage {
    /// Hashes `payload` in the domain of `account`
    pub fn new(account: &SafeAccountState, payload: impl Into<MessagePayload>) -> Result<Self> {
        let payload = payload.into();
        let domain = account.domain();
        let hash = hash_message(&domain, &payload)?;

        Ok(Self {
            payload,
            domain,
            hash,
            signatures: SignatureAggregate::new(),
        })
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    pub fn domain(&self) -> &SafeDomain {
        &self.domain
    }

    /// The Safe message hash owners sign
    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn signatures(&self) -> &SignatureAggregate {
        &self.signatures
    }

    /// Adds raw signature bytes from `signer`
    pub fn add_signature(
        &mut self,
        signer: Address,
        signature: impl Into<Bytes>,
        kind: SignatureKind,
    ) -> Result<()> {
        let signature = SafeSignature::new(signer, signature, kind)?;
        self.add_signed(signature)
    }

    pub fn add_signed(&mut self, signature: SafeSignature) -> Result<()> {
        check_signature_kind(self.domain.version, &signature)?;
        verify_signature(self.hash, &signature)?;
        self.signatures.insert(signature);
        Ok(())
    }

    /// All collected signatures, packed
    pub fn encoded_signatures(&self) -> Bytes {
        self.signatures.encode()
    }

    /// Packed signatures of current owners, ready for `isValidSignature`
    pub fn to_eip1271_signature(&self, account: &SafeAccountState) -> Result<Bytes> {
        let signatures = owner_signatures(&self.signatures, account);
        if (signatures.len() as u64) < account.threshold() {
            return Err(Error::ThresholdNotMet {
                valid: signatures.len(),
                threshold: account.threshold() as usize,
            });
        }
        Ok(signatures.encode())
    }

    /// The call that marks this message as signed on-chain
    ///
    /// `lib` is either SignMessageLib (1.3.0 onwards, delegate called) or the
    /// Safe singleton itself on older versions. The returned call still has
    /// to go through a Safe transaction.
    pub fn sign_message_call(&self, safe: Address, lib: &ContractAdapter) -> Result<Call> {
        let inner = hash_safe_message(&self.payload)?;
        let data = lib.encode("signMessage", &[DynSolValue::Bytes(inner.to_vec())])?;

        match lib.kind() {
            ContractKind::SignMessageLib => Ok(Call::delegate_call(lib.address(), data)),
            ContractKind::Safe => Ok(Call::call(safe, data)),
            other => Err(Error::invalid(
                "contract",
                format!("{other} cannot sign messages"),
            )),
        }
    }
}
