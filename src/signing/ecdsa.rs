//! ECDSA signature generation for Safe transactions

use alloy::primitives::{Address, Bytes, Signature, B256, U256};
use alloy::signers::Signer;

use super::signature::{SafeSignature, SignatureKind, SIGNATURE_LENGTH};
use crate::error::{Error, Result};
use crate::version::{SafeFeature, SafeVersion};

/// How an owner signs the Safe hash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SigningMethod {
    /// Sign the EIP-712 hash directly (v = 27/28)
    #[default]
    TypedData,
    /// Sign with the EIP-191 personal message prefix (v = 31/32)
    EthSign,
}

/// Signs a Safe hash and formats it for the Safe contract
///
/// Safe expects signatures in the format: r (32 bytes) || s (32 bytes) || v (1 byte).
/// eth_sign signatures get v shifted by 4 so the contract applies the prefix
/// before recovering.
pub async fn sign_hash<S: Signer + Sync + ?Sized>(
    signer: &S,
    hash: B256,
    method: SigningMethod,
) -> Result<SafeSignature> {
    let signature = match method {
        SigningMethod::TypedData => signer.sign_hash(&hash).await?,
        SigningMethod::EthSign => signer.sign_message(hash.as_slice()).await?,
    };

    // v is a bool (y_parity) in alloy - true means odd
    let v_byte = match (method, signature.v()) {
        (SigningMethod::TypedData, false) => 27u8,
        (SigningMethod::TypedData, true) => 28,
        (SigningMethod::EthSign, false) => 31,
        (SigningMethod::EthSign, true) => 32,
    };

    let mut sig_bytes = Vec::with_capacity(SIGNATURE_LENGTH);
    sig_bytes.extend_from_slice(&signature.r().to_be_bytes::<32>());
    sig_bytes.extend_from_slice(&signature.s().to_be_bytes::<32>());
    sig_bytes.push(v_byte);

    SafeSignature::ecdsa(signer.address(), sig_bytes)
}

/// Normalises v of an externally produced signature for the Safe contract
///
/// Wallets return v as 0/1 or 27/28; eth_sign signatures additionally need
/// the +4 marker.
pub fn adjust_v_in_signature(method: SigningMethod, signature: &[u8]) -> Result<Bytes> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(Error::MalformedSignature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }

    let mut v = signature[64];
    if matches!(v, 0 | 1) {
        v += 27;
    }

    let v = match (method, v) {
        (SigningMethod::TypedData, 27 | 28) => v,
        (SigningMethod::EthSign, 27 | 28) => v + 4,
        (SigningMethod::EthSign, 31 | 32) => v,
        _ => {
            return Err(Error::MalformedSignature(format!(
                "invalid v value {} for {method:?}",
                signature[64]
            )))
        }
    };

    let mut adjusted = signature.to_vec();
    adjusted[64] = v;
    Ok(Bytes::from(adjusted))
}

/// Encodes a pre-validated signature for a given owner
///
/// Accepted when the owner is the transaction sender or has called `approveHash`.
pub fn pre_validated_signature(owner: Address) -> SafeSignature {
    SafeSignature::pre_validated(owner)
}

/// Recovers the signer of a 65-byte ECDSA Safe signature over `hash`
pub fn recover_signer(hash: B256, signature: &[u8]) -> Result<Address> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(Error::MalformedSignature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }

    let r = U256::from_be_slice(&signature[..32]);
    let s = U256::from_be_slice(&signature[32..64]);
    let v = signature[64];

    let recovered = match v {
        27 | 28 => Signature::new(r, s, v == 28).recover_address_from_prehash(&hash),
        31 | 32 => Signature::new(r, s, v == 32).recover_address_from_msg(hash.as_slice()),
        _ => {
            return Err(Error::MalformedSignature(format!(
                "invalid ECDSA v value: {v}"
            )))
        }
    };

    recovered.map_err(|e| Error::MalformedSignature(e.to_string()))
}

/// Checks that an ECDSA signature over `hash` was produced by its claimed signer
///
/// Contract and pre-validated signatures are only checkable on-chain and pass.
pub fn verify_signature(hash: B256, signature: &SafeSignature) -> Result<()> {
    if !signature.kind().is_ecdsa() {
        return Ok(());
    }

    let recovered = recover_signer(hash, signature.data())?;
    if recovered != signature.signer() {
        return Err(Error::invalid(
            "signature",
            format!("signed by {recovered}, not {}", signature.signer()),
        ));
    }
    Ok(())
}

/// Rejects signature kinds the Safe at `version` cannot verify
///
/// 1.0.0 has no eth_sign branch in `checkSignatures`; v = 31/32 would reach
/// ecrecover unchanged and fail on-chain.
pub fn check_signature_kind(version: SafeVersion, signature: &SafeSignature) -> Result<()> {
    if signature.kind() == SignatureKind::EthSign && !version.has_feature(SafeFeature::EthSign) {
        return Err(Error::UnsupportedSignature {
            kind: signature.kind(),
            version,
        });
    }
    Ok(())
}
