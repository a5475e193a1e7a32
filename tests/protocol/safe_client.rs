//! Safe client tests against the in-memory transport

use alloy::primitives::{Address, B256, U256};
use alloy::signers::Signer;
use alloy::sol_types::SolCall;
use safe_protocol::{
    predict_deployment_address, ContractAdapter, ContractKind, Error, ISafe, Safe,
    SafeAccountConfig, SafeDeploymentConfig, SafeTransactionRequest, SafeVersion, SigningMethod,
    StaticRegistry,
};

use crate::common::{transfer_data, MockTransport, Owners, CHAIN_ID, SAFE_ADDRESS, TOKEN};

fn client(owners: &Owners) -> (Safe<MockTransport>, MockTransport) {
    let transport = MockTransport::new(owners.addresses(), 2);
    let safe = Safe::new(transport.clone(), SAFE_ADDRESS, CHAIN_ID, SafeVersion::V1_4_1).unwrap();
    (safe, transport)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_account_state() {
    let owners = Owners::new();
    let (safe, transport) = client(&owners);
    transport.update(|state| state.nonce = U256::from(12));

    let state = safe.account_state().await.unwrap();

    assert_eq!(state.address(), SAFE_ADDRESS);
    assert_eq!(state.owners(), owners.addresses().as_slice());
    assert_eq!(state.threshold(), 2);
    assert_eq!(state.nonce(), U256::from(12));
    assert!(safe.is_owner(owners.b.address()).await.unwrap());
    assert!(!safe.is_owner(Address::repeat_byte(0x99)).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_reads_version() {
    let owners = Owners::new();
    let transport = MockTransport::new(owners.addresses(), 2);
    transport.update(|state| state.version = "1.3.0".to_string());

    let safe = Safe::connect(transport, SAFE_ADDRESS, CHAIN_ID).await.unwrap();
    assert_eq!(safe.version(), SafeVersion::V1_3_0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_and_execute() {
    let owners = Owners::new();
    let (safe, transport) = client(&owners);

    let mut tx = safe
        .create_transaction(SafeTransactionRequest::new(
            TOKEN,
            U256::ZERO,
            transfer_data(owners.c.address(), 5),
        ))
        .await
        .unwrap();

    safe.sign_transaction(&mut tx, &owners.c, SigningMethod::TypedData)
        .await
        .unwrap();
    safe.sign_transaction(&mut tx, &owners.a, SigningMethod::EthSign)
        .await
        .unwrap();

    let result = safe.execute(&tx).await.unwrap();
    assert!(result.success);

    let submissions = transport.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].to, SAFE_ADDRESS);

    let call = ISafe::execTransactionCall::abi_decode(&submissions[0].data).unwrap();
    assert_eq!(call.to, TOKEN);
    assert_eq!(&call.signatures[..65], &tx.signatures().get(&owners.a.address()).unwrap().data()[..]);

    // nonce moved on; the same transaction cannot run again
    assert!(matches!(
        safe.execute(&tx).await,
        Err(Error::InvalidParameter { what: "nonce", .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_execute_rechecks_owners() {
    let owners = Owners::new();
    let (safe, transport) = client(&owners);

    let mut tx = safe
        .create_transaction(SafeTransactionRequest::new(TOKEN, U256::ZERO, vec![]))
        .await
        .unwrap();
    safe.sign_transaction(&mut tx, &owners.a, SigningMethod::TypedData)
        .await
        .unwrap();
    safe.sign_transaction(&mut tx, &owners.b, SigningMethod::TypedData)
        .await
        .unwrap();

    // B is swapped out on-chain after signing
    let replacement = Address::repeat_byte(0x44);
    transport.update(|state| state.owners = vec![owners.a.address(), replacement, owners.c.address()]);

    assert!(matches!(
        safe.execute(&tx).await,
        Err(Error::ThresholdNotMet { valid: 1, threshold: 2 })
    ));
    assert!(transport.submissions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_owner_cannot_sign() {
    let owners = Owners::new();
    let transport = MockTransport::new(vec![owners.a.address(), owners.b.address()], 1);
    let safe = Safe::new(transport, SAFE_ADDRESS, CHAIN_ID, SafeVersion::V1_4_1).unwrap();

    let mut tx = safe
        .create_transaction(SafeTransactionRequest::new(TOKEN, U256::ZERO, vec![]))
        .await
        .unwrap();

    assert!(matches!(
        safe.sign_transaction(&mut tx, &owners.c, SigningMethod::TypedData).await,
        Err(Error::NotOwner { .. })
    ));
    assert!(tx.signatures().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_approve_hash() {
    let owners = Owners::new();
    let (safe, transport) = client(&owners);
    let hash = B256::repeat_byte(0xab);

    let data = safe.approve_hash_call_data(hash).unwrap();
    assert_eq!(
        data.to_vec(),
        ISafe::approveHashCall { hashToApprove: hash }.abi_encode()
    );

    safe.approve_hash(hash).await.unwrap();
    assert_eq!(transport.submissions()[0].data, data);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_through_multisend() {
    let owners = Owners::new();
    let (safe, _transport) = client(&owners);
    let multi_send = ContractAdapter::resolve(
        ContractKind::MultiSendCallOnly,
        SafeVersion::V1_4_1,
        CHAIN_ID,
        &StaticRegistry::canonical(),
    )
    .unwrap();

    let calls = vec![
        safe_protocol::Call::call(TOKEN, transfer_data(owners.a.address(), 1)),
        safe_protocol::Call::call(TOKEN, transfer_data(owners.b.address(), 2)),
    ];
    let tx = safe.create_batch_transaction(&calls, &multi_send).await.unwrap();

    assert_eq!(tx.params().to, multi_send.address());
    assert_eq!(tx.params().operation, safe_protocol::Operation::DelegateCall);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_predict_deployment_address() {
    let owners = Owners::new();
    let transport = MockTransport::new(vec![], 1);
    let registry = StaticRegistry::canonical();
    let account = SafeAccountConfig::new(owners.addresses(), 2);

    let first = predict_deployment_address(
        &transport,
        &registry,
        CHAIN_ID,
        &account,
        &SafeDeploymentConfig::new().with_salt_nonce(U256::from(7)),
    )
    .await
    .unwrap();
    let second = predict_deployment_address(
        &transport,
        &registry,
        CHAIN_ID,
        &account,
        &SafeDeploymentConfig::new().with_salt_nonce(U256::from(8)),
    )
    .await
    .unwrap();

    assert_ne!(first, second);
    assert_ne!(first, Address::ZERO);
}
