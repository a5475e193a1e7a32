//! Property-based tests for hashing, address prediction and signature packing

use alloy::primitives::{Address, Bytes, B256, U256};
use proptest::prelude::*;
use safe_protocol::{
    decode_signatures, encode_signatures, hash_transaction, predict_safe_address, DeploymentParams,
    Operation, SafeDomain, SafeSignature, SafeTxParams, SafeVersion, SignatureAggregate,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>()).prop_map(Address::from)
}

fn arb_bytes(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..max_len).prop_map(Bytes::from)
}

fn arb_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_be_bytes(bytes))
}

fn arb_version() -> impl Strategy<Value = SafeVersion> {
    prop::sample::select(SafeVersion::ALL.to_vec())
}

fn arb_deployment() -> impl Strategy<Value = DeploymentParams> {
    (arb_address(), arb_address(), arb_bytes(256), arb_u256()).prop_map(
        |(factory, singleton, initializer, salt_nonce)| {
            DeploymentParams::new(factory, singleton, initializer, salt_nonce)
        },
    )
}

fn arb_safe_tx() -> impl Strategy<Value = SafeTxParams> {
    (
        arb_address(),  // to
        arb_u256(),     // value
        arb_bytes(256), // data
        any::<bool>(),  // delegate call
        arb_u256(),     // safe_tx_gas
        arb_u256(),     // nonce
    )
        .prop_map(|(to, value, data, delegate, safe_tx_gas, nonce)| {
            let operation = if delegate {
                Operation::DelegateCall
            } else {
                Operation::Call
            };
            let mut params = SafeTxParams::new(to, value, data, operation).with_nonce(nonce);
            params.safe_tx_gas = safe_tx_gas;
            params
        })
}

/// Non-ECDSA signatures, which carry their signer in the encoding
fn arb_signature() -> impl Strategy<Value = SafeSignature> {
    (arb_address(), any::<bool>(), arb_bytes(128)).prop_map(|(signer, contract, data)| {
        if contract {
            SafeSignature::contract(signer, data)
        } else {
            SafeSignature::pre_validated(signer)
        }
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_prediction_is_deterministic(params in arb_deployment(), code in arb_bytes(64)) {
        prop_assert_eq!(
            predict_safe_address(&params, &code),
            predict_safe_address(&params.clone(), &code)
        );
    }

    #[test]
    fn prop_prediction_depends_on_salt(params in arb_deployment(), code in arb_bytes(64)) {
        let mut other = params.clone();
        other.salt_nonce = params.salt_nonce.wrapping_add(U256::from(1));
        prop_assert_ne!(predict_safe_address(&params, &code), predict_safe_address(&other, &code));
    }

    #[test]
    fn prop_prediction_depends_on_initializer(params in arb_deployment(), code in arb_bytes(64)) {
        let mut other = params.clone();
        let mut initializer = params.initializer.to_vec();
        initializer.push(0x00);
        other.initializer = Bytes::from(initializer);
        prop_assert_ne!(predict_safe_address(&params, &code), predict_safe_address(&other, &code));
    }

    #[test]
    fn prop_transaction_hash_depends_on_nonce(
        params in arb_safe_tx(),
        safe in arb_address(),
        chain_id in 1u64..1_000_000,
        version in arb_version(),
    ) {
        let domain = SafeDomain::new(chain_id, safe, version);
        let next = params.clone().with_nonce(params.nonce.wrapping_add(U256::from(1)));

        prop_assert_eq!(hash_transaction(&domain, &params), hash_transaction(&domain, &params.clone()));
        prop_assert_ne!(hash_transaction(&domain, &params), hash_transaction(&domain, &next));
    }

    #[test]
    fn prop_encoding_orders_signers(signatures in prop::collection::vec(arb_signature(), 1..8)) {
        let packed = encode_signatures(&signatures);
        let decoded = decode_signatures(B256::ZERO, &packed).unwrap();

        prop_assert!(decoded.windows(2).all(|w| w[0].signer() < w[1].signer()));
    }

    #[test]
    fn prop_aggregate_round_trip(signatures in prop::collection::vec(arb_signature(), 1..8)) {
        let aggregate: SignatureAggregate = signatures.into_iter().collect();
        let decoded = decode_signatures(B256::ZERO, &aggregate.encode()).unwrap();

        prop_assert!(decoded.windows(2).all(|w| w[0].signer() < w[1].signer()));
        prop_assert_eq!(decoded.into_iter().collect::<SignatureAggregate>(), aggregate);
    }
}
