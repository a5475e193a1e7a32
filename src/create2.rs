//! CREATE2 address computation for Safe proxy deployment
//!
//! This module provides utilities for computing deterministic Safe proxy addresses
//! using CREATE2. The Safe proxy factory deploys proxies at deterministic addresses
//! based on the singleton address, initializer data, and salt nonce.

use std::str::FromStr;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;

use crate::chain::{ChainAddresses, ContractKind, DeploymentRegistry};
use crate::config::{SafeAccountConfig, SafeDeploymentConfig};
use crate::contracts::{ContractAdapter, ISafeSetup, ISafeSetupV1_0_0};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::version::{SafeFeature, SafeVersion};

/// Inputs of a proxy deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParams {
    /// SafeProxyFactory address
    pub factory: Address,
    /// Safe singleton (mastercopy) address
    pub singleton: Address,
    /// ABI-encoded `setup` call
    pub initializer: Bytes,
    /// User-provided nonce for address derivation
    pub salt_nonce: U256,
}

impl DeploymentParams {
    pub fn new(
        factory: Address,
        singleton: Address,
        initializer: impl Into<Bytes>,
        salt_nonce: U256,
    ) -> Self {
        Self {
            factory,
            singleton,
            initializer: initializer.into(),
            salt_nonce,
        }
    }

    /// Parses untrusted string inputs
    ///
    /// Addresses must be 20-byte hex. The salt nonce accepts decimal or
    /// `0x`-prefixed hex and must not be negative.
    pub fn parse(
        factory: &str,
        singleton: &str,
        initializer: impl Into<Bytes>,
        salt_nonce: &str,
    ) -> Result<Self> {
        let factory = parse_address("factory", factory)?;
        let singleton = parse_address("singleton", singleton)?;

        let salt_nonce = salt_nonce.trim();
        if salt_nonce.starts_with('-') {
            return Err(Error::invalid("salt nonce", format!("{salt_nonce} is negative")));
        }
        let salt_nonce = U256::from_str(salt_nonce)
            .map_err(|e| Error::invalid("salt nonce", format!("{salt_nonce}: {e}")))?;

        Ok(Self::new(factory, singleton, initializer, salt_nonce))
    }

    /// `keccak256(keccak256(initializer) ++ saltNonce)`
    pub fn salt(&self) -> B256 {
        compute_salt(&self.initializer, self.salt_nonce)
    }
}

fn parse_address(what: &'static str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|e| Error::invalid(what, format!("{value}: {e}")))
}

fn compute_salt(initializer: &[u8], salt_nonce: U256) -> B256 {
    let initializer_hash = keccak256(initializer);

    let mut salt_input = [0u8; 64];
    salt_input[..32].copy_from_slice(initializer_hash.as_slice());
    salt_input[32..64].copy_from_slice(&salt_nonce.to_be_bytes::<32>());

    keccak256(salt_input)
}

/// Encodes the Safe.setup() call for proxy initialization
///
/// Safe 1.0.0 has no fallback handler argument; asking for one there is an
/// error. Later versions default to the canonical handler of that version.
pub fn encode_setup_call(config: &SafeAccountConfig, version: SafeVersion) -> Result<Bytes> {
    config.validate()?;

    let data = if version.has_feature(SafeFeature::SafeFallbackHandler) {
        let fallback_handler = config
            .fallback_handler
            .or(ChainAddresses::for_version(version).fallback_handler)
            .unwrap_or(Address::ZERO);

        ISafeSetup::setupCall {
            _owners: config.owners.clone(),
            _threshold: U256::from(config.threshold),
            to: config.to,
            data: config.data.clone(),
            fallbackHandler: fallback_handler,
            paymentToken: config.payment_token,
            payment: config.payment,
            paymentReceiver: config.payment_receiver,
        }
        .abi_encode()
    } else {
        if config.fallback_handler.is_some() {
            return Err(Error::invalid(
                "fallback handler",
                format!("not supported by Safe v{version}"),
            ));
        }

        ISafeSetupV1_0_0::setupCall {
            _owners: config.owners.clone(),
            _threshold: U256::from(config.threshold),
            to: config.to,
            data: config.data.clone(),
            paymentToken: config.payment_token,
            payment: config.payment,
            paymentReceiver: config.payment_receiver,
        }
        .abi_encode()
    };

    Ok(Bytes::from(data))
}

/// Encodes `createProxyWithNonce` against the factory's resolved ABI
pub fn encode_create_proxy_with_nonce(
    factory: &ContractAdapter,
    singleton: Address,
    initializer: &Bytes,
    salt_nonce: U256,
) -> Result<Bytes> {
    factory.encode(
        "createProxyWithNonce",
        &[
            DynSolValue::Address(singleton),
            DynSolValue::Bytes(initializer.to_vec()),
            DynSolValue::Uint(salt_nonce, 256),
        ],
    )
}

/// Reads `proxyCreationCode()` from the factory
pub async fn fetch_proxy_creation_code<T: Transport>(
    factory: &ContractAdapter,
    transport: &T,
) -> Result<Bytes> {
    let output = factory
        .read(transport, "proxyCreationCode", &[])
        .await
        .map_err(|e| Error::Fetch {
            what: "proxy creation code",
            reason: e.to_string(),
        })?;

    match output.first().and_then(|value| value.as_bytes()) {
        Some(code) => Ok(Bytes::copy_from_slice(code)),
        None => Err(Error::Fetch {
            what: "proxy creation code",
            reason: "factory returned no bytes".to_string(),
        }),
    }
}

/// Computes the CREATE2 address for a Safe proxy
///
/// The Safe proxy factory uses a specific CREATE2 formula:
/// ```text
/// salt = keccak256(keccak256(initializer) ++ saltNonce)
/// init_code = proxyCreationCode ++ singleton_address_padded
/// address = keccak256(0xff ++ factory ++ salt ++ keccak256(init_code))[12:]
/// ```
pub fn compute_create2_address(
    factory: Address,
    singleton: Address,
    initializer: &Bytes,
    salt_nonce: U256,
    creation_code: &Bytes,
) -> Address {
    let salt = compute_salt(initializer, salt_nonce);

    // Singleton is the proxy's constructor argument, padded to 32 bytes
    let mut init_code = creation_code.to_vec();
    let mut singleton_padded = [0u8; 32];
    singleton_padded[12..].copy_from_slice(singleton.as_slice());
    init_code.extend_from_slice(&singleton_padded);

    let init_code_hash = keccak256(&init_code);

    let mut create2_input = Vec::with_capacity(1 + 20 + 32 + 32);
    create2_input.push(0xff);
    create2_input.extend_from_slice(factory.as_slice());
    create2_input.extend_from_slice(salt.as_slice());
    create2_input.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(&create2_input);

    Address::from_slice(&hash[12..])
}

/// Predicts the proxy address for `params` given the factory's creation code
pub fn predict_safe_address(params: &DeploymentParams, creation_code: &Bytes) -> Address {
    compute_create2_address(
        params.factory,
        params.singleton,
        &params.initializer,
        params.salt_nonce,
        creation_code,
    )
}

/// Builds the deployment parameters of a new Safe from the registry
pub fn deployment_params(
    registry: &impl DeploymentRegistry,
    chain_id: u64,
    account: &SafeAccountConfig,
    deployment: &SafeDeploymentConfig,
) -> Result<DeploymentParams> {
    let version = deployment.safe_version;
    let factory = ContractAdapter::resolve(ContractKind::SafeProxyFactory, version, chain_id, registry)?;
    let singleton = ContractAdapter::resolve(ContractKind::Safe, version, chain_id, registry)?;
    let initializer = encode_setup_call(account, version)?;

    Ok(DeploymentParams::new(
        factory.address(),
        singleton.address(),
        initializer,
        deployment.salt_nonce,
    ))
}

/// Predicts the address a new Safe would be deployed at on `chain_id`
///
/// The creation code is read from the factory so the prediction matches the
/// bytecode actually deployed on that chain.
pub async fn predict_deployment_address<T: Transport>(
    transport: &T,
    registry: &impl DeploymentRegistry,
    chain_id: u64,
    account: &SafeAccountConfig,
    deployment: &SafeDeploymentConfig,
) -> Result<Address> {
    let params = deployment_params(registry, chain_id, account, deployment)?;
    let factory = ContractAdapter::resolve(
        ContractKind::SafeProxyFactory,
        deployment.safe_version,
        chain_id,
        registry,
    )?;
    let creation_code = fetch_proxy_creation_code(&factory, transport).await?;

    let address = predict_safe_address(&params, &creation_code);
    tracing::debug!(%address, version = %deployment.safe_version, chain_id, "predicted Safe address");
    Ok(address)
}
