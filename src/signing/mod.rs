//! Signature generation, aggregation and packing for Safe transactions

mod codec;
mod ecdsa;
mod signature;

pub use codec::{
    build_contract_signature, decode_signatures, encode_signatures, ContractSignatureBuilder,
    SignatureAggregate, SignatureNode, MAX_CONTRACT_SIGNATURE_DEPTH,
};
pub use ecdsa::{
    adjust_v_in_signature, check_signature_kind, pre_validated_signature, recover_signer, sign_hash, verify_signature,
    SigningMethod,
};
pub use signature::{SafeSignature, SignatureKind, SIGNATURE_LENGTH};
