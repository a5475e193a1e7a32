//! Owner signatures as the Safe contract sees them

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of a static signature slot (r || s || v)
pub const SIGNATURE_LENGTH: usize = 65;

/// How a signature is verified by the Safe contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureKind {
    /// ECDSA over the EIP-191 prefixed hash (v = 31/32)
    EthSign,
    /// ECDSA over the raw EIP-712 hash (v = 27/28)
    TypedData,
    /// ERC-1271 contract signature (v = 0)
    Contract,
    /// Hash approved on-chain or submitted by the owner (v = 1)
    PreValidated,
}

impl SignatureKind {
    /// Whether the kind is checked with ecrecover
    pub fn is_ecdsa(&self) -> bool {
        matches!(self, SignatureKind::EthSign | SignatureKind::TypedData)
    }
}

/// A single owner's signature
///
/// For ECDSA kinds `data` holds the 65 raw bytes. For contract signatures it
/// holds the nested signature bytes handed to `isValidSignature`. For
/// pre-validated signatures it holds the 65-byte placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSignature {
    signer: Address,
    data: Bytes,
    kind: SignatureKind,
}

impl SafeSignature {
    /// Creates a signature, checking the bytes against the kind
    pub fn new(signer: Address, data: impl Into<Bytes>, kind: SignatureKind) -> Result<Self> {
        let data = data.into();
        match kind {
            SignatureKind::EthSign | SignatureKind::TypedData => {
                check_ecdsa_length(&data)?;
                let v = data[64];
                let expected = match kind {
                    SignatureKind::EthSign => matches!(v, 31 | 32),
                    _ => matches!(v, 27 | 28),
                };
                if !expected {
                    return Err(Error::MalformedSignature(format!(
                        "v = {v} does not match {kind:?} signature"
                    )));
                }
                Ok(Self { signer, data, kind })
            }
            SignatureKind::Contract => Ok(Self::contract(signer, data)),
            SignatureKind::PreValidated => {
                let placeholder = Self::pre_validated(signer);
                if !data.is_empty() && data != placeholder.data {
                    return Err(Error::MalformedSignature(format!(
                        "pre-validated signature does not encode signer {signer}"
                    )));
                }
                Ok(placeholder)
            }
        }
    }

    /// Creates an ECDSA signature, deriving the kind from v
    pub fn ecdsa(signer: Address, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        check_ecdsa_length(&data)?;
        let kind = match data[64] {
            27 | 28 => SignatureKind::TypedData,
            31 | 32 => SignatureKind::EthSign,
            v => {
                return Err(Error::MalformedSignature(format!(
                    "invalid ECDSA v value: {v}"
                )))
            }
        };
        Ok(Self { signer, data, kind })
    }

    /// Creates an ERC-1271 contract signature
    pub fn contract(signer: Address, data: impl Into<Bytes>) -> Self {
        Self {
            signer,
            data: data.into(),
            kind: SignatureKind::Contract,
        }
    }

    /// Creates an approved-hash placeholder for `signer`
    pub fn pre_validated(signer: Address) -> Self {
        let mut data = [0u8; SIGNATURE_LENGTH];
        data[12..32].copy_from_slice(signer.as_slice());
        data[64] = 1;

        Self {
            signer,
            data: Bytes::copy_from_slice(&data),
            kind: SignatureKind::PreValidated,
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    /// Whether the signature carries a dynamic section
    pub fn is_dynamic(&self) -> bool {
        self.kind == SignatureKind::Contract
    }

    /// The 65-byte static slot
    ///
    /// `dynamic_offset` is only used by contract signatures and is measured
    /// from the start of the packed blob.
    pub fn static_part(&self, dynamic_offset: usize) -> [u8; SIGNATURE_LENGTH] {
        let mut slot = [0u8; SIGNATURE_LENGTH];
        match self.kind {
            SignatureKind::Contract => {
                slot[12..32].copy_from_slice(self.signer.as_slice());
                slot[32..64].copy_from_slice(&U256::from(dynamic_offset).to_be_bytes::<32>());
            }
            _ => slot.copy_from_slice(&self.data[..SIGNATURE_LENGTH]),
        }
        slot
    }

    /// The trailing `len || data` section of a contract signature
    pub fn dynamic_part(&self) -> Vec<u8> {
        if !self.is_dynamic() {
            return Vec::new();
        }

        let mut part = Vec::with_capacity(32 + self.data.len());
        part.extend_from_slice(&U256::from(self.data.len()).to_be_bytes::<32>());
        part.extend_from_slice(&self.data);
        part
    }
}

fn check_ecdsa_length(data: &[u8]) -> Result<()> {
    if data.len() != SIGNATURE_LENGTH {
        return Err(Error::MalformedSignature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            data.len()
        )));
    }
    Ok(())
}
