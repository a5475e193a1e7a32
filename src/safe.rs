//! Safe client bound to one deployed account

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::Signer;

use crate::chain::{ContractKind, StaticRegistry};
use crate::contracts::{ContractAdapter, UnresolvedContract, WriteOutcome};
use crate::error::{Error, Result};
use crate::signing::{sign_hash, SigningMethod};
use crate::transaction::{SafeAccountState, SafeTransaction, SafeTransactionRequest, TransactionBuilder};
use crate::transport::{ExecutionResult, Transport};
use crate::types::Call;
use crate::version::SafeVersion;

/// Safe client for reading state and executing transactions through a [`Transport`]
pub struct Safe<T> {
    /// Transport for calls and submissions
    transport: T,
    /// Singleton ABI of `version`, bound to the proxy address
    contract: ContractAdapter,
}

impl<T: Transport> Safe<T> {
    /// Creates a client for the Safe proxy at `address`
    pub fn new(transport: T, address: Address, chain_id: u64, version: SafeVersion) -> Result<Self> {
        let contract = UnresolvedContract::new(ContractKind::Safe, version, chain_id)
            .with_address(address)
            .resolve(&StaticRegistry::new())?;

        Ok(Self {
            transport,
            contract,
        })
    }

    /// Reads the contract version and creates a client for it
    pub async fn connect(transport: T, address: Address, chain_id: u64) -> Result<Self> {
        let probe = Self::new(transport, address, chain_id, SafeVersion::default())?;
        let output = probe.contract.read(&probe.transport, "VERSION", &[]).await?;
        let version = first(&output, "version")?
            .as_str()
            .ok_or_else(|| fetch_error("version", "not a string"))?
            .parse::<SafeVersion>()?;

        tracing::debug!(safe = %address, %version, chain_id, "connected to Safe");
        Self::new(probe.transport, address, chain_id, version)
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.contract.chain_id()
    }

    pub fn version(&self) -> SafeVersion {
        self.contract.version()
    }

    /// The singleton ABI bound to this Safe
    pub fn contract(&self) -> &ContractAdapter {
        &self.contract
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the owners of the Safe
    pub async fn owners(&self) -> Result<Vec<Address>> {
        let output = self.read("getOwners", &[]).await?;
        first(&output, "owners")?
            .as_array()
            .ok_or_else(|| fetch_error("owners", "not an array"))?
            .iter()
            .map(|owner| {
                owner
                    .as_address()
                    .ok_or_else(|| fetch_error("owners", "not an address"))
            })
            .collect()
    }

    /// Gets the threshold of the Safe
    pub async fn threshold(&self) -> Result<u64> {
        let threshold = self.read_uint("getThreshold", "threshold").await?;
        u64::try_from(threshold).map_err(|_| fetch_error("threshold", "out of range"))
    }

    /// Gets the current nonce of the Safe
    pub async fn nonce(&self) -> Result<U256> {
        self.read_uint("nonce", "nonce").await
    }

    /// Checks if an address is an owner of the Safe
    pub async fn is_owner(&self, address: Address) -> Result<bool> {
        let output = self.read("isOwner", &[DynSolValue::Address(address)]).await?;
        first(&output, "is_owner")?
            .as_bool()
            .ok_or_else(|| fetch_error("is_owner", "not a bool"))
    }

    /// Reads owners, threshold and nonce
    pub async fn account_state(&self) -> Result<SafeAccountState> {
        let owners = self.owners().await?;
        let threshold = self.threshold().await?;
        let nonce = self.nonce().await?;

        SafeAccountState::new(
            self.address(),
            self.chain_id(),
            self.version(),
            owners,
            threshold,
            nonce,
        )
    }

    /// Builds a transaction at the current on-chain nonce unless one is given
    pub async fn create_transaction(&self, request: SafeTransactionRequest) -> Result<SafeTransaction> {
        let state = self.account_state().await?;
        Ok(TransactionBuilder::new(&state).build(request))
    }

    /// Builds a single transaction out of `calls`, batching through `multi_send`
    pub async fn create_batch_transaction(
        &self,
        calls: &[Call],
        multi_send: &ContractAdapter,
    ) -> Result<SafeTransaction> {
        let state = self.account_state().await?;
        TransactionBuilder::new(&state).build_batch(calls, multi_send)
    }

    /// Signs `transaction` as `signer`, who must currently be an owner
    pub async fn sign_transaction<S: Signer + Sync + ?Sized>(
        &self,
        transaction: &mut SafeTransaction,
        signer: &S,
        method: SigningMethod,
    ) -> Result<()> {
        let signer_address = signer.address();
        if !self.is_owner(signer_address).await? {
            return Err(Error::NotOwner {
                signer: signer_address,
                safe: self.address(),
            });
        }

        let signature = sign_hash(signer, transaction.hash(), method).await?;
        transaction.add_signed(signature)
    }

    /// Call data of `approveHash(hash)`, to be sent by an owner
    pub fn approve_hash_call_data(&self, hash: B256) -> Result<Bytes> {
        self.contract
            .encode("approveHash", &[DynSolValue::FixedBytes(hash, 32)])
    }

    /// Sends `approveHash(hash)` from the transport's account
    pub async fn approve_hash(&self, hash: B256) -> Result<ExecutionResult> {
        let outcome = self
            .contract
            .write("approveHash", &[DynSolValue::FixedBytes(hash, 32)], Some(&self.transport))
            .await?;

        match outcome {
            WriteOutcome::Executed(result) => Ok(result),
            WriteOutcome::CallData(_) => Err(Error::ExecutionFailed {
                reason: "approveHash was not submitted".to_string(),
            }),
        }
    }

    /// Executes a signed transaction
    ///
    /// Owners, threshold and nonce are re-read first: signatures from owners
    /// removed since signing are dropped, and a stale nonce is rejected locally
    /// instead of reverting on-chain.
    pub async fn execute(&self, transaction: &SafeTransaction) -> Result<ExecutionResult> {
        let state = self.account_state().await?;

        if transaction.params().nonce != state.nonce() {
            return Err(Error::invalid(
                "nonce",
                format!(
                    "transaction uses nonce {}, Safe is at {}",
                    transaction.params().nonce,
                    state.nonce()
                ),
            ));
        }

        let data = transaction.to_executable_call_data(&state, &self.contract)?;

        tracing::debug!(
            safe = %self.address(),
            safe_tx_hash = %transaction.hash(),
            signatures = transaction.valid_signature_count(&state),
            "executing Safe transaction"
        );

        let result = self
            .transport
            .send_transaction(self.address(), data, U256::ZERO)
            .await?;

        if !result.success {
            tracing::warn!(tx_hash = %result.tx_hash, "Safe transaction reverted");
        }
        Ok(result)
    }

    async fn read(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        self.contract.read(&self.transport, method, args).await
    }

    async fn read_uint(&self, method: &str, what: &'static str) -> Result<U256> {
        let output = self.read(method, &[]).await?;
        first(&output, what)?
            .as_uint()
            .map(|(value, _)| value)
            .ok_or_else(|| fetch_error(what, "not an integer"))
    }
}

fn first<'a>(values: &'a [DynSolValue], what: &'static str) -> Result<&'a DynSolValue> {
    values
        .first()
        .ok_or_else(|| fetch_error(what, "empty return data"))
}

fn fetch_error(what: &'static str, reason: &str) -> Error {
    Error::Fetch {
        what,
        reason: reason.to_string(),
    }
}
