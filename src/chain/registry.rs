//! Read-only lookup of deployed Safe contracts
//!
//! The adapter never consults global state: a [`DeploymentRegistry`] is passed in
//! when a contract is resolved, so tests can supply synthetic registries.

use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::version::SafeVersion;

/// The Safe contracts the adapter knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    Safe,
    SafeProxyFactory,
    MultiSend,
    MultiSendCallOnly,
    CompatibilityFallbackHandler,
    SignMessageLib,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractKind::Safe => "Safe",
            ContractKind::SafeProxyFactory => "SafeProxyFactory",
            ContractKind::MultiSend => "MultiSend",
            ContractKind::MultiSendCallOnly => "MultiSendCallOnly",
            ContractKind::CompatibilityFallbackHandler => "CompatibilityFallbackHandler",
            ContractKind::SignMessageLib => "SignMessageLib",
        };
        f.write_str(name)
    }
}

/// A contract deployment found in a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
}

/// Source of deployment addresses keyed by chain id, version and contract
pub trait DeploymentRegistry {
    /// Looks up a deployment, returning `None` when nothing is registered
    fn lookup(&self, chain_id: u64, version: SafeVersion, kind: ContractKind)
        -> Option<Deployment>;
}

/// Canonical Safe contract addresses for one version
///
/// These are deployed with the deterministic deployment proxy and are the same
/// on every chain that carries the canonical deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAddresses {
    /// Safe singleton address
    pub safe_singleton: Address,
    /// Safe proxy factory address
    pub proxy_factory: Address,
    /// MultiSend contract address
    pub multi_send: Address,
    /// MultiSendCallOnly contract address (1.3.0+)
    pub multi_send_call_only: Option<Address>,
    /// Compatibility fallback handler (1.1.1+)
    pub fallback_handler: Option<Address>,
    /// SignMessageLib (1.3.0+)
    pub sign_message_lib: Option<Address>,
}

impl Default for ChainAddresses {
    fn default() -> Self {
        Self::v1_4_1()
    }
}

impl ChainAddresses {
    /// Returns the canonical addresses for `version`
    pub fn for_version(version: SafeVersion) -> Self {
        match version {
            SafeVersion::V1_0_0 => Self::v1_0_0(),
            SafeVersion::V1_1_1 => Self::v1_1_1(),
            SafeVersion::V1_2_0 => Self::v1_2_0(),
            SafeVersion::V1_3_0 => Self::v1_3_0(),
            SafeVersion::V1_4_1 => Self::v1_4_1(),
        }
    }

    /// Returns the canonical Safe v1.4.1 addresses
    pub fn v1_4_1() -> Self {
        Self {
            safe_singleton: address!("41675C099F32341bf84BFc5382aF534df5C7461a"),
            proxy_factory: address!("4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67"),
            multi_send: address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526"),
            multi_send_call_only: Some(address!("9641d764fc13c8B624c04430C7356C1C7C8102e2")),
            fallback_handler: Some(address!("fd0732Dc9E303f09fCEf3a7388Ad10A83459Ec99")),
            sign_message_lib: Some(address!("d53cd0aB83D845Ac265BE939c57F53AD838012c9")),
        }
    }

    /// Returns the canonical Safe v1.3.0 addresses
    pub fn v1_3_0() -> Self {
        Self {
            safe_singleton: address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"),
            proxy_factory: address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2"),
            multi_send: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
            multi_send_call_only: Some(address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D")),
            fallback_handler: Some(address!("f48f2B2d2a534e402487b3ee7C18c33Aec0Fe5e4")),
            sign_message_lib: Some(address!("A65387F16B013cf2Af4605Ad8aA5ec25a2cbA3a2")),
        }
    }

    /// Returns the Safe v1.2.0 addresses (1.1.1 factory and helpers)
    pub fn v1_2_0() -> Self {
        Self {
            safe_singleton: address!("6851D6fDFAfD08c0295C392436245E5bc78B0185"),
            ..Self::v1_1_1()
        }
    }

    /// Returns the Safe v1.1.1 addresses
    pub fn v1_1_1() -> Self {
        Self {
            safe_singleton: address!("34CfAC646f301356fAa8B21e94227e3583Fe3F5F"),
            proxy_factory: address!("76E2cFc1F5Fa8F6a5b3fC4c8F4788F0116861F9B"),
            multi_send: address!("8D29bE29923b68abfDD21e541b9374737B49cdAD"),
            multi_send_call_only: None,
            fallback_handler: Some(address!("d5D82B6aDDc9027B22dCA772Aa68D5d74cdBdF44")),
            sign_message_lib: None,
        }
    }

    /// Returns the Safe v1.0.0 addresses
    pub fn v1_0_0() -> Self {
        Self {
            safe_singleton: address!("b6029EA3B2c51D09a50B53CA8012FeEB05bDa35A"),
            proxy_factory: address!("12302fE9c02ff50939BaAaaf415fc226C078613C"),
            multi_send: address!("8D29bE29923b68abfDD21e541b9374737B49cdAD"),
            multi_send_call_only: None,
            fallback_handler: None,
            sign_message_lib: None,
        }
    }

    /// Returns the address of `kind`, if this version ships it
    pub fn get(&self, kind: ContractKind) -> Option<Address> {
        match kind {
            ContractKind::Safe => Some(self.safe_singleton),
            ContractKind::SafeProxyFactory => Some(self.proxy_factory),
            ContractKind::MultiSend => Some(self.multi_send),
            ContractKind::MultiSendCallOnly => self.multi_send_call_only,
            ContractKind::CompatibilityFallbackHandler => self.fallback_handler,
            ContractKind::SignMessageLib => self.sign_message_lib,
        }
    }
}

/// In-memory registry
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: HashMap<(u64, SafeVersion, ContractKind), Deployment>,
}

impl StaticRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the canonical addresses of every version on the
    /// chains in [`chain_ids::CANONICAL`]
    pub fn canonical() -> Self {
        let mut registry = Self::new();
        for chain_id in chain_ids::CANONICAL {
            registry.insert_canonical(chain_id);
        }
        registry
    }

    /// Registers the canonical addresses of every version for `chain_id`
    pub fn insert_canonical(&mut self, chain_id: u64) -> &mut Self {
        for version in SafeVersion::ALL {
            let addresses = ChainAddresses::for_version(version);
            for kind in [
                ContractKind::Safe,
                ContractKind::SafeProxyFactory,
                ContractKind::MultiSend,
                ContractKind::MultiSendCallOnly,
                ContractKind::CompatibilityFallbackHandler,
                ContractKind::SignMessageLib,
            ] {
                if let Some(address) = addresses.get(kind) {
                    self.insert(chain_id, version, kind, address);
                }
            }
        }
        self
    }

    /// Registers a single deployment, replacing any previous entry
    pub fn insert(
        &mut self,
        chain_id: u64,
        version: SafeVersion,
        kind: ContractKind,
        address: Address,
    ) -> &mut Self {
        self.entries
            .insert((chain_id, version, kind), Deployment { address });
        self
    }

    /// Number of registered deployments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DeploymentRegistry for StaticRegistry {
    fn lookup(
        &self,
        chain_id: u64,
        version: SafeVersion,
        kind: ContractKind,
    ) -> Option<Deployment> {
        self.entries.get(&(chain_id, version, kind)).copied()
    }
}

/// Well-known chain IDs
pub mod chain_ids {
    pub const MAINNET: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const ARBITRUM: u64 = 42161;
    pub const OPTIMISM: u64 = 10;
    pub const BASE: u64 = 8453;
    pub const POLYGON: u64 = 137;
    pub const BSC: u64 = 56;
    pub const AVALANCHE: u64 = 43114;
    pub const GNOSIS: u64 = 100;

    /// Chains seeded by `StaticRegistry::canonical`
    pub const CANONICAL: [u64; 9] = [
        MAINNET, SEPOLIA, ARBITRUM, OPTIMISM, BASE, POLYGON, BSC, AVALANCHE, GNOSIS,
    ];
}
