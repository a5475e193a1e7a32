//! One contract surface over every Safe version
//!
//! A contract starts as an [`UnresolvedContract`] that knows its kind, version and
//! chain. Resolving it fixes the address (custom, or looked up in an injected
//! registry) and the method table (custom ABI, or the built-in table for the
//! version). The resulting [`ContractAdapter`] is immutable.

use std::collections::HashMap;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes, U256};

use super::abi::method_signatures;
use crate::chain::{ContractKind, DeploymentRegistry};
use crate::error::{Error, Result};
use crate::transport::{ExecutionResult, Transport};
use crate::version::SafeVersion;

/// Where a resolved contract's method table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiSource {
    /// Built-in table for the contract version
    Default,
    /// Caller supplied ABI
    Custom,
}

/// Outcome of [`ContractAdapter::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No signer attached; the encoded call data to submit elsewhere
    CallData(Bytes),
    /// Submitted through the attached signer
    Executed(ExecutionResult),
}

/// A contract whose address and ABI have not been fixed yet
#[derive(Debug, Clone)]
pub struct UnresolvedContract {
    kind: ContractKind,
    version: SafeVersion,
    chain_id: u64,
    custom_address: Option<Address>,
    custom_abi: Option<JsonAbi>,
}

impl UnresolvedContract {
    /// Creates an unresolved contract of `kind` at `version` on `chain_id`
    pub fn new(kind: ContractKind, version: SafeVersion, chain_id: u64) -> Self {
        Self {
            kind,
            version,
            chain_id,
            custom_address: None,
            custom_abi: None,
        }
    }

    /// Uses `address` instead of the registry entry
    pub fn with_address(mut self, address: Address) -> Self {
        self.custom_address = Some(address);
        self
    }

    /// Uses `abi` instead of the built-in method table
    pub fn with_abi(mut self, abi: JsonAbi) -> Self {
        self.custom_abi = Some(abi);
        self
    }

    /// Fixes address and ABI, consulting `registry` when no custom address was given
    pub fn resolve(self, registry: &impl DeploymentRegistry) -> Result<ContractAdapter> {
        let not_deployed = || Error::ContractNotDeployed {
            contract: self.kind,
            version: self.version,
            chain_id: self.chain_id,
        };

        let address = match self.custom_address {
            Some(address) => address,
            None => {
                registry
                    .lookup(self.chain_id, self.version, self.kind)
                    .ok_or_else(not_deployed)?
                    .address
            }
        };

        let (methods, abi_source) = match &self.custom_abi {
            Some(abi) => (methods_from_abi(abi), AbiSource::Custom),
            None => {
                let signatures = method_signatures(self.kind, self.version);
                if signatures.is_empty() {
                    return Err(not_deployed());
                }
                (methods_from_signatures(&signatures)?, AbiSource::Default)
            }
        };

        tracing::debug!(
            contract = %self.kind,
            version = %self.version,
            chain_id = self.chain_id,
            %address,
            ?abi_source,
            methods = methods.len(),
            "resolved contract"
        );

        Ok(ContractAdapter {
            kind: self.kind,
            version: self.version,
            chain_id: self.chain_id,
            address,
            abi_source,
            methods,
        })
    }
}

fn methods_from_signatures(signatures: &[&str]) -> Result<HashMap<String, Function>> {
    signatures
        .iter()
        .map(|signature| {
            let function = Function::parse(signature)
                .map_err(|e| Error::Abi(format!("{signature}: {e}")))?;
            Ok((function.name.clone(), function))
        })
        .collect()
}

fn methods_from_abi(abi: &JsonAbi) -> HashMap<String, Function> {
    let mut methods = HashMap::new();
    for function in abi.functions() {
        // first overload wins
        methods
            .entry(function.name.clone())
            .or_insert_with(|| function.clone());
    }
    methods
}

/// A resolved contract exposing `read` / `write` by method name
#[derive(Debug, Clone)]
pub struct ContractAdapter {
    kind: ContractKind,
    version: SafeVersion,
    chain_id: u64,
    address: Address,
    abi_source: AbiSource,
    methods: HashMap<String, Function>,
}

impl ContractAdapter {
    /// Resolves `kind` at `version` on `chain_id` from `registry` with the default ABI
    pub fn resolve(
        kind: ContractKind,
        version: SafeVersion,
        chain_id: u64,
        registry: &impl DeploymentRegistry,
    ) -> Result<Self> {
        UnresolvedContract::new(kind, version, chain_id).resolve(registry)
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn version(&self) -> SafeVersion {
        self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi_source(&self) -> AbiSource {
        self.abi_source
    }

    /// Returns true if the resolved ABI has `method`
    pub fn supports(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Looks up the ABI entry for `method`
    pub fn function(&self, method: &str) -> Result<&Function> {
        self.methods
            .get(method)
            .ok_or_else(|| Error::UnsupportedMethod {
                method: method.to_string(),
                contract: self.kind,
                version: self.version,
            })
    }

    /// ABI-encodes a call to `method`, selector included
    pub fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let function = self.function(method)?;
        let data = function.abi_encode_input(args)?;
        Ok(Bytes::from(data))
    }

    /// Decodes the return data of `method`
    pub fn decode_output(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>> {
        let function = self.function(method)?;
        Ok(function.abi_decode_output(data)?)
    }

    /// Calls a view method and decodes its outputs
    pub async fn read<T: Transport>(
        &self,
        transport: &T,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let data = self.encode(method, args)?;
        let output = transport.call(self.address, data).await?;
        self.decode_output(method, &output)
    }

    /// Encodes a state-changing call and, when a signer is attached, submits it
    pub async fn write<T: Transport>(
        &self,
        method: &str,
        args: &[DynSolValue],
        signer: Option<&T>,
    ) -> Result<WriteOutcome> {
        let data = self.encode(method, args)?;
        match signer {
            None => Ok(WriteOutcome::CallData(data)),
            Some(transport) => {
                tracing::debug!(contract = %self.kind, method, to = %self.address, "submitting");
                let result = transport
                    .send_transaction(self.address, data, U256::ZERO)
                    .await?;
                Ok(WriteOutcome::Executed(result))
            }
        }
    }
}
