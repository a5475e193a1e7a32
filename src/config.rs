//! Configuration for new Safe accounts

use std::collections::HashSet;

use alloy::primitives::{address, Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::SafeVersion;

/// Linked-list sentinel used by the Safe owner manager; never a valid owner
pub const SENTINEL_OWNERS: Address = address!("0x0000000000000000000000000000000000000001");

/// Arguments of `Safe.setup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeAccountConfig {
    /// Initial owners
    pub owners: Vec<Address>,
    /// Number of required confirmations (default: 1)
    #[serde(default = "default_threshold")]
    pub threshold: u64,
    /// Optional delegate call target run during setup
    #[serde(default)]
    pub to: Address,
    /// Calldata for the setup delegate call
    #[serde(default)]
    pub data: Bytes,
    /// Fallback handler (default: canonical handler of the Safe version)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_handler: Option<Address>,
    /// Token used to pay the deployer (zero for ETH)
    #[serde(default)]
    pub payment_token: Address,
    /// Payment amount
    #[serde(default)]
    pub payment: U256,
    /// Payment receiver (zero for tx.origin)
    #[serde(default)]
    pub payment_receiver: Address,
}

fn default_threshold() -> u64 {
    1
}

impl SafeAccountConfig {
    /// Creates a config with the given owners and threshold
    pub fn new(owners: Vec<Address>, threshold: u64) -> Self {
        Self {
            owners,
            threshold,
            to: Address::ZERO,
            data: Bytes::new(),
            fallback_handler: None,
            payment_token: Address::ZERO,
            payment: U256::ZERO,
            payment_receiver: Address::ZERO,
        }
    }

    /// Sets a custom fallback handler
    pub fn with_fallback_handler(mut self, handler: Address) -> Self {
        self.fallback_handler = Some(handler);
        self
    }

    /// Sets the delegate call run during setup
    pub fn with_setup_call(mut self, to: Address, data: impl Into<Bytes>) -> Self {
        self.to = to;
        self.data = data.into();
        self
    }

    /// Sets the deployment payment
    pub fn with_payment(mut self, token: Address, payment: U256, receiver: Address) -> Self {
        self.payment_token = token;
        self.payment = payment;
        self.payment_receiver = receiver;
        self
    }

    /// Checks the owner set and threshold the way `setup` would
    pub fn validate(&self) -> Result<()> {
        validate_owners(&self.owners, self.threshold)
    }
}

/// Checks that owners are non-empty, distinct and usable, and that
/// `1 <= threshold <= owners.len()`
pub fn validate_owners(owners: &[Address], threshold: u64) -> Result<()> {
    if owners.is_empty() {
        return Err(Error::invalid("owners", "owner set is empty"));
    }

    let mut seen = HashSet::with_capacity(owners.len());
    for owner in owners {
        if *owner == Address::ZERO || *owner == SENTINEL_OWNERS {
            return Err(Error::invalid("owners", format!("{owner} cannot be an owner")));
        }
        if !seen.insert(owner) {
            return Err(Error::invalid("owners", format!("duplicate owner {owner}")));
        }
    }

    if threshold == 0 || threshold > owners.len() as u64 {
        return Err(Error::invalid(
            "threshold",
            format!("{threshold} (must be 1-{})", owners.len()),
        ));
    }

    Ok(())
}

/// Parameters that pick the deployment address but are not part of `setup`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDeploymentConfig {
    /// Salt nonce for CREATE2 address computation (default: 0)
    #[serde(default)]
    pub salt_nonce: U256,
    /// Contract version to deploy (default: 1.4.1)
    #[serde(default)]
    pub safe_version: SafeVersion,
}

impl SafeDeploymentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salt_nonce(mut self, salt_nonce: U256) -> Self {
        self.salt_nonce = salt_nonce;
        self
    }

    pub fn with_safe_version(mut self, version: SafeVersion) -> Self {
        self.safe_version = version;
        self
    }
}
