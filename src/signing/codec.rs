//! Packing and unpacking of the `signatures` argument of `execTransaction`
//!
//! Layout: one 65-byte static slot per signer in ascending signer order,
//! followed by the dynamic sections of contract signatures. A contract slot
//! stores `pad32(signer) || offset || 0x00` where `offset` points at a
//! `len || data` section measured from the start of the blob.

use std::collections::btree_map;
use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, B256, U256};

use super::ecdsa::recover_signer;
use super::signature::{SafeSignature, SIGNATURE_LENGTH};
use crate::error::{Error, Result};

/// Default bound on nested contract signatures
pub const MAX_CONTRACT_SIGNATURE_DEPTH: usize = 8;

/// Signatures collected for one transaction or message, keyed by signer
///
/// Keys are kept in numeric address order, which is the order the Safe
/// contract requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureAggregate {
    signatures: BTreeMap<Address, SafeSignature>,
}

impl SignatureAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signature, returning the one it replaced for the same signer
    pub fn insert(&mut self, signature: SafeSignature) -> Option<SafeSignature> {
        self.signatures.insert(signature.signer(), signature)
    }

    pub fn get(&self, signer: &Address) -> Option<&SafeSignature> {
        self.signatures.get(signer)
    }

    pub fn remove(&mut self, signer: &Address) -> Option<SafeSignature> {
        self.signatures.remove(signer)
    }

    pub fn contains(&self, signer: &Address) -> bool {
        self.signatures.contains_key(signer)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Signers in ascending order
    pub fn signers(&self) -> impl Iterator<Item = Address> + '_ {
        self.signatures.keys().copied()
    }

    /// Signatures in ascending signer order
    pub fn iter(&self) -> btree_map::Values<'_, Address, SafeSignature> {
        self.signatures.values()
    }

    /// Merges another aggregate into this one
    pub fn merge(&mut self, other: SignatureAggregate) {
        self.signatures.extend(other.signatures);
    }

    /// Packs all signatures into the contract's byte layout
    pub fn encode(&self) -> Bytes {
        encode_signatures(self.iter())
    }
}

impl FromIterator<SafeSignature> for SignatureAggregate {
    fn from_iter<I: IntoIterator<Item = SafeSignature>>(iter: I) -> Self {
        let mut aggregate = Self::new();
        for signature in iter {
            aggregate.insert(signature);
        }
        aggregate
    }
}

impl<'a> IntoIterator for &'a SignatureAggregate {
    type Item = &'a SafeSignature;
    type IntoIter = btree_map::Values<'a, Address, SafeSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Packs signatures in strictly ascending signer order
///
/// Ordering is applied here regardless of the input order. When a signer
/// appears more than once, the last signature given for it is packed.
pub fn encode_signatures<'a>(signatures: impl IntoIterator<Item = &'a SafeSignature>) -> Bytes {
    let sorted: BTreeMap<Address, &SafeSignature> = signatures
        .into_iter()
        .map(|signature| (signature.signer(), signature))
        .collect();

    let mut static_parts = Vec::with_capacity(sorted.len() * SIGNATURE_LENGTH);
    let mut dynamic_parts = Vec::new();
    let static_len = sorted.len() * SIGNATURE_LENGTH;

    for signature in sorted.into_values() {
        let offset = static_len + dynamic_parts.len();
        static_parts.extend_from_slice(&signature.static_part(offset));
        dynamic_parts.extend(signature.dynamic_part());
    }

    tracing::debug!(
        count = static_len / SIGNATURE_LENGTH,
        dynamic_bytes = dynamic_parts.len(),
        "packed signatures"
    );

    static_parts.extend(dynamic_parts);
    Bytes::from(static_parts)
}

/// Unpacks a signature blob produced for `hash`
///
/// ECDSA signers are recovered from `hash`; other kinds carry their signer in
/// the slot. The static block ends where the first dynamic section begins.
pub fn decode_signatures(hash: B256, data: &[u8]) -> Result<Vec<SafeSignature>> {
    let mut signatures = Vec::new();
    let mut static_end = data.len();
    let mut pos = 0;

    while pos < static_end {
        if pos + SIGNATURE_LENGTH > static_end {
            return Err(Error::MalformedSignature(format!(
                "truncated signature at byte {pos}: {} bytes left",
                static_end - pos
            )));
        }

        let slot = &data[pos..pos + SIGNATURE_LENGTH];
        let signature = match slot[64] {
            0 => {
                let signer = slot_address(slot);
                let offset = slot_usize(&slot[32..64], "offset")?;
                if offset < pos + SIGNATURE_LENGTH {
                    return Err(Error::MalformedSignature(format!(
                        "contract signature offset {offset} points into the static block"
                    )));
                }
                let body = dynamic_section(data, offset)?;
                static_end = static_end.min(offset);
                SafeSignature::contract(signer, Bytes::copy_from_slice(body))
            }
            1 => SafeSignature::pre_validated(slot_address(slot)),
            27 | 28 | 31 | 32 => {
                let signer = recover_signer(hash, slot)?;
                SafeSignature::ecdsa(signer, Bytes::copy_from_slice(slot))?
            }
            v => {
                return Err(Error::MalformedSignature(format!(
                    "invalid v value {v} at byte {pos}"
                )))
            }
        };

        signatures.push(signature);
        pos += SIGNATURE_LENGTH;
    }

    Ok(signatures)
}

fn slot_address(slot: &[u8]) -> Address {
    Address::from_slice(&slot[12..32])
}

fn slot_usize(word: &[u8], what: &str) -> Result<usize> {
    let value = U256::from_be_slice(word);
    usize::try_from(value)
        .map_err(|_| Error::MalformedSignature(format!("{what} {value} out of range")))
}

fn dynamic_section(data: &[u8], offset: usize) -> Result<&[u8]> {
    let len_end = offset
        .checked_add(32)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            Error::MalformedSignature(format!("contract signature offset {offset} out of bounds"))
        })?;
    let len = slot_usize(&data[offset..len_end], "length")?;
    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            Error::MalformedSignature(format!(
                "contract signature of {len} bytes at {offset} exceeds the blob"
            ))
        })?;
    Ok(&data[len_end..end])
}

/// An owner's contribution to a nested contract signature
///
/// A `Safe` node is an owner that is itself a Safe: its signature is the
/// packed signatures of its own owners, which may in turn be Safes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureNode {
    /// A signature already produced by the owner
    Leaf(SafeSignature),
    /// A Safe owner whose signature is built from its owners' nodes
    Safe {
        address: Address,
        owners: Vec<SignatureNode>,
    },
}

/// Builds ERC-1271 signatures for Safes owned by other Safes
///
/// Leaf signatures must already sign whatever hash the nested Safe validates.
#[derive(Debug, Clone, Copy)]
pub struct ContractSignatureBuilder {
    max_depth: usize,
}

impl Default for ContractSignatureBuilder {
    fn default() -> Self {
        Self {
            max_depth: MAX_CONTRACT_SIGNATURE_DEPTH,
        }
    }
}

impl ContractSignatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Builds the contract signature of `signer` from its owners' nodes
    pub fn build(&self, signer: Address, owners: &[SignatureNode]) -> Result<SafeSignature> {
        self.build_at(signer, owners, 1)
    }

    fn build_at(
        &self,
        signer: Address,
        owners: &[SignatureNode],
        depth: usize,
    ) -> Result<SafeSignature> {
        if depth > self.max_depth {
            return Err(Error::RecursionLimit {
                max_depth: self.max_depth,
            });
        }
        if owners.is_empty() {
            return Err(Error::MalformedSignature(format!(
                "contract signature for {signer} has no owner signatures"
            )));
        }

        let mut nested = SignatureAggregate::new();
        for node in owners {
            let signature = match node {
                SignatureNode::Leaf(signature) => signature.clone(),
                SignatureNode::Safe { address, owners } => {
                    self.build_at(*address, owners, depth + 1)?
                }
            };
            nested.insert(signature);
        }

        Ok(SafeSignature::contract(signer, nested.encode()))
    }
}

/// Builds a contract signature with the default depth bound
pub fn build_contract_signature(signer: Address, owners: &[SignatureNode]) -> Result<SafeSignature> {
    ContractSignatureBuilder::new().build(signer, owners)
}
