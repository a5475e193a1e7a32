//! Common test utilities for protocol tests

use std::sync::{Arc, Mutex};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol_types::SolCall;
use safe_protocol::{
    chain_ids, ExecutionResult, ISafe, ISafeProxyFactory, Result, SafeAccountState, SafeVersion,
    Transport,
};

pub const SAFE_ADDRESS: Address =
    alloy::primitives::address!("0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
pub const TOKEN: Address = alloy::primitives::address!("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
pub const CHAIN_ID: u64 = chain_ids::SEPOLIA;

/// Three owners with fixed keys, sorted so that A < B < C numerically
pub struct Owners {
    pub a: PrivateKeySigner,
    pub b: PrivateKeySigner,
    pub c: PrivateKeySigner,
}

impl Owners {
    pub fn new() -> Self {
        let mut signers: Vec<PrivateKeySigner> = [0x11u8, 0x22, 0x33]
            .into_iter()
            .map(|byte| PrivateKeySigner::from_bytes(&B256::repeat_byte(byte)).unwrap())
            .collect();
        signers.sort_by_key(|signer| signer.address());

        let c = signers.pop().unwrap();
        let b = signers.pop().unwrap();
        let a = signers.pop().unwrap();
        assert!(a.address() < b.address() && b.address() < c.address());

        Self { a, b, c }
    }

    pub fn addresses(&self) -> Vec<Address> {
        vec![self.a.address(), self.b.address(), self.c.address()]
    }

    /// 2-of-3 Safe at nonce 0
    pub fn account(&self) -> SafeAccountState {
        SafeAccountState::new(
            SAFE_ADDRESS,
            CHAIN_ID,
            SafeVersion::V1_4_1,
            self.addresses(),
            2,
            U256::ZERO,
        )
        .unwrap()
    }
}

/// On-chain state served by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockSafeState {
    pub version: String,
    pub owners: Vec<Address>,
    pub threshold: u64,
    pub nonce: U256,
    pub creation_code: Bytes,
}

/// A submitted transaction
#[derive(Debug, Clone)]
pub struct Submission {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// In-memory transport answering the Safe and factory view calls
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockSafeState>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MockTransport {
    pub fn new(owners: Vec<Address>, threshold: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockSafeState {
                version: "1.4.1".to_string(),
                owners,
                threshold,
                nonce: U256::ZERO,
                creation_code: Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]),
            })),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut MockSafeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn answer(&self, data: &[u8]) -> Option<DynSolValue> {
        let state = self.state.lock().unwrap();
        let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;

        let value = if selector == ISafe::getOwnersCall::SELECTOR {
            DynSolValue::Array(state.owners.iter().copied().map(DynSolValue::Address).collect())
        } else if selector == ISafe::getThresholdCall::SELECTOR {
            DynSolValue::Uint(U256::from(state.threshold), 256)
        } else if selector == ISafe::nonceCall::SELECTOR {
            DynSolValue::Uint(state.nonce, 256)
        } else if selector == ISafe::isOwnerCall::SELECTOR {
            let owner = Address::from_slice(data.get(16..36)?);
            DynSolValue::Bool(state.owners.contains(&owner))
        } else if selector == ISafeProxyFactory::proxyCreationCodeCall::SELECTOR {
            DynSolValue::Bytes(state.creation_code.to_vec())
        } else if selector[..] == keccak256("VERSION()")[..4] {
            DynSolValue::String(state.version.clone())
        } else {
            return None;
        };

        Some(value)
    }
}

impl Transport for MockTransport {
    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        match self.answer(&data) {
            Some(value) => Ok(Bytes::from(DynSolValue::Tuple(vec![value]).abi_encode_params())),
            None => Err(safe_protocol::Error::Provider("execution reverted".to_string())),
        }
    }

    async fn send_transaction(&self, to: Address, data: Bytes, value: U256) -> Result<ExecutionResult> {
        let tx_hash = keccak256(&data);
        self.submissions
            .lock()
            .unwrap()
            .push(Submission { to, data, value });
        self.update(|state| state.nonce += U256::from(1));

        Ok(ExecutionResult {
            tx_hash,
            success: true,
        })
    }
}

/// Calldata of an ERC-20 transfer used as the transaction payload
pub fn transfer_data(to: Address, amount: u64) -> Bytes {
    Bytes::from(
        safe_protocol::IERC20::transferCall {
            to,
            amount: U256::from(amount),
        }
        .abi_encode(),
    )
}
