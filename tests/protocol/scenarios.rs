//! End-to-end scenarios over a 2-of-3 Safe

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::Signer;
use alloy::sol_types::SolCall;
use safe_protocol::{
    build_contract_signature, decode_signatures, hash_transaction, predict_safe_address, sign_hash,
    ContractAdapter, ContractKind, DeploymentParams, Error, ISafe, SafeAccountConfig,
    SafeAccountState, SafeSignature, SafeTransactionRequest, SafeVersion, SignatureKind,
    SignatureNode, SigningMethod, StaticRegistry, TransactionBuilder,
};

use crate::common::{transfer_data, Owners, CHAIN_ID, SAFE_ADDRESS, TOKEN};

fn safe_contract() -> ContractAdapter {
    ContractAdapter::resolve(
        ContractKind::Safe,
        SafeVersion::V1_4_1,
        CHAIN_ID,
        &StaticRegistry::canonical(),
    )
    .unwrap()
}

fn transfer_request(owners: &Owners) -> SafeTransactionRequest {
    SafeTransactionRequest::new(TOKEN, U256::ZERO, transfer_data(owners.c.address(), 1_000))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signatures_packed_in_owner_order() {
    let owners = Owners::new();
    let account = owners.account();
    let mut tx = TransactionBuilder::new(&account).build(transfer_request(&owners));

    // B signs first, then A
    let sig_b = sign_hash(&owners.b, tx.hash(), SigningMethod::TypedData).await.unwrap();
    let sig_a = sign_hash(&owners.a, tx.hash(), SigningMethod::TypedData).await.unwrap();
    tx.add_signed(sig_b.clone()).unwrap();
    tx.add_signed(sig_a.clone()).unwrap();

    let packed = tx.encoded_signatures();
    assert_eq!(packed.len(), 130);
    assert_eq!(&packed[..65], &sig_a.data()[..]);
    assert_eq!(&packed[65..], &sig_b.data()[..]);

    assert!(tx.is_ready_to_execute(&account));

    let call_data = tx.to_executable_call_data(&account, &safe_contract()).unwrap();
    let decoded = ISafe::execTransactionCall::abi_decode(&call_data).unwrap();
    assert_eq!(decoded.to, TOKEN);
    assert_eq!(decoded.signatures, packed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_signature_below_threshold() {
    let owners = Owners::new();
    let account = owners.account();
    let mut tx = TransactionBuilder::new(&account).build(transfer_request(&owners));

    tx.add_signed(sign_hash(&owners.c, tx.hash(), SigningMethod::TypedData).await.unwrap())
        .unwrap();

    assert!(!tx.is_ready_to_execute(&account));
    assert!(matches!(
        tx.to_executable_call_data(&account, &safe_contract()),
        Err(Error::ThresholdNotMet {
            valid: 1,
            threshold: 2
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_removed_owner_no_longer_counts() {
    let owners = Owners::new();
    let mut account = owners.account();
    let mut tx = TransactionBuilder::new(&account).build(transfer_request(&owners));

    tx.add_signed(sign_hash(&owners.a, tx.hash(), SigningMethod::TypedData).await.unwrap())
        .unwrap();
    tx.add_signed(sign_hash(&owners.b, tx.hash(), SigningMethod::EthSign).await.unwrap())
        .unwrap();
    assert!(tx.is_ready_to_execute(&account));

    // B is removed between signing and execution
    account.remove_owner(owners.b.address(), 2).unwrap();

    assert!(!tx.is_ready_to_execute(&account));
    assert_eq!(tx.signatures().len(), 2);
    assert!(matches!(
        tx.to_executable_call_data(&account, &safe_contract()),
        Err(Error::ThresholdNotMet { valid: 1, .. })
    ));
}

#[test]
fn test_predicted_addresses_differ_by_salt() {
    let owners = Owners::new();
    let initializer = safe_protocol::encode_setup_call(
        &SafeAccountConfig::new(owners.addresses(), 2),
        SafeVersion::V1_4_1,
    )
    .unwrap();
    let creation_code = Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    let addresses = safe_protocol::ChainAddresses::v1_4_1();

    let predict = |salt: u64| {
        let params = DeploymentParams::new(
            addresses.proxy_factory,
            addresses.safe_singleton,
            initializer.clone(),
            U256::from(salt),
        );
        predict_safe_address(&params, &creation_code)
    };

    let seven = predict(7);
    let eight = predict(8);

    assert_ne!(seven, eight);
    assert_ne!(seven, Address::ZERO);
    assert_ne!(eight, Address::ZERO);
    assert_eq!(seven, predict(7));
}

#[test]
fn test_truncated_ecdsa_blob_is_malformed() {
    let mut blob = vec![0x42u8; 40];
    blob[39] = 27;

    assert!(matches!(
        decode_signatures(B256::repeat_byte(0x01), &blob),
        Err(Error::MalformedSignature(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mixed_signature_kinds_round_trip() {
    let owners = Owners::new();
    let account = owners.account();
    let mut tx = TransactionBuilder::new(&account).build(transfer_request(&owners));

    tx.add_signed(sign_hash(&owners.c, tx.hash(), SigningMethod::EthSign).await.unwrap())
        .unwrap();
    tx.add_pre_validated(owners.a.address());

    let decoded = decode_signatures(tx.hash(), &tx.encoded_signatures()).unwrap();
    let kinds: Vec<_> = decoded.iter().map(|s| (s.signer(), s.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            (owners.a.address(), SignatureKind::PreValidated),
            (owners.c.address(), SignatureKind::EthSign),
        ]
    );
    assert!(tx.is_ready_to_execute(&account));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_safe_owned_by_safe() {
    let owners = Owners::new();
    // Owner B of the outer Safe is a 1-of-1 Safe owned by A
    let inner_safe = Address::repeat_byte(0xee);
    let outer = SafeAccountState::new(
        SAFE_ADDRESS,
        CHAIN_ID,
        SafeVersion::V1_4_1,
        vec![owners.a.address(), inner_safe],
        2,
        U256::ZERO,
    )
    .unwrap();
    let mut tx = TransactionBuilder::new(&outer).build(transfer_request(&owners));

    let inner_hash = B256::repeat_byte(0x77);
    let inner_sig = sign_hash(&owners.a, inner_hash, SigningMethod::TypedData).await.unwrap();
    let contract_sig = build_contract_signature(inner_safe, &[SignatureNode::Leaf(inner_sig.clone())])
        .unwrap();

    tx.add_signed(contract_sig).unwrap();
    tx.add_signed(sign_hash(&owners.a, tx.hash(), SigningMethod::TypedData).await.unwrap())
        .unwrap();
    assert!(tx.is_ready_to_execute(&outer));

    let decoded = decode_signatures(tx.hash(), &tx.encoded_signatures()).unwrap();
    let nested = decoded
        .iter()
        .find(|s| s.kind() == SignatureKind::Contract)
        .unwrap();
    assert_eq!(nested.signer(), inner_safe);

    let inner = decode_signatures(inner_hash, nested.data()).unwrap();
    assert_eq!(inner, vec![inner_sig]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_legacy_domain_ignores_chain_id() {
    let owners = Owners::new();
    let build_hash = |version: SafeVersion, chain_id: u64| {
        let account = SafeAccountState::new(
            SAFE_ADDRESS,
            chain_id,
            version,
            owners.addresses(),
            2,
            U256::ZERO,
        )
        .unwrap();
        TransactionBuilder::new(&account)
            .build(transfer_request(&owners))
            .hash()
    };

    assert_ne!(build_hash(SafeVersion::V1_4_1, 1), build_hash(SafeVersion::V1_4_1, 10));
    assert_ne!(build_hash(SafeVersion::V1_3_0, 1), build_hash(SafeVersion::V1_3_0, 10));
    assert_eq!(build_hash(SafeVersion::V1_2_0, 1), build_hash(SafeVersion::V1_2_0, 10));
    assert_eq!(build_hash(SafeVersion::V1_0_0, 1), build_hash(SafeVersion::V1_1_1, 10));
}

#[test]
fn test_hash_matches_params() {
    let owners = Owners::new();
    let account = owners.account();
    let tx = TransactionBuilder::new(&account).build(transfer_request(&owners));

    assert_eq!(tx.hash(), hash_transaction(&account.domain(), tx.params()));
    assert!(SafeSignature::new(owners.a.address(), vec![0u8; 65], SignatureKind::TypedData).is_err());
}
