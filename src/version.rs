//! Safe contract versions and the behaviour that differs between them

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A released Safe contract version
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum SafeVersion {
    V1_0_0,
    V1_1_1,
    V1_2_0,
    V1_3_0,
    #[default]
    V1_4_1,
}

impl SafeVersion {
    /// All supported versions, oldest first
    pub const ALL: [SafeVersion; 5] = [
        SafeVersion::V1_0_0,
        SafeVersion::V1_1_1,
        SafeVersion::V1_2_0,
        SafeVersion::V1_3_0,
        SafeVersion::V1_4_1,
    ];

    /// Returns the version string as reported by the contract's `VERSION()`
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeVersion::V1_0_0 => "1.0.0",
            SafeVersion::V1_1_1 => "1.1.1",
            SafeVersion::V1_2_0 => "1.2.0",
            SafeVersion::V1_3_0 => "1.3.0",
            SafeVersion::V1_4_1 => "1.4.1",
        }
    }

    /// Returns the version as a semver value
    pub fn semver(&self) -> Version {
        match self {
            SafeVersion::V1_0_0 => Version::new(1, 0, 0),
            SafeVersion::V1_1_1 => Version::new(1, 1, 1),
            SafeVersion::V1_2_0 => Version::new(1, 2, 0),
            SafeVersion::V1_3_0 => Version::new(1, 3, 0),
            SafeVersion::V1_4_1 => Version::new(1, 4, 1),
        }
    }

    /// Checks whether this version supports the given feature
    pub fn has_feature(&self, feature: SafeFeature) -> bool {
        has_safe_feature(feature, *self)
    }
}

impl fmt::Display for SafeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        SafeVersion::ALL
            .into_iter()
            .find(|version| version.as_str() == trimmed)
            .ok_or_else(|| Error::invalid("safe version", format!("unsupported version {s:?}")))
    }
}

impl TryFrom<String> for SafeVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SafeVersion> for String {
    fn from(version: SafeVersion) -> Self {
        version.as_str().to_string()
    }
}

/// Behaviour that is only available on some Safe versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeFeature {
    /// The EIP-712 domain binds the chain id
    Eip712ChainId,
    /// eth_sign signatures (v = 31/32) are accepted
    EthSign,
    /// `setup` takes a fallback handler argument
    SafeFallbackHandler,
    /// `safeTxGas` may be zero when `gasPrice` is zero
    SafeTxGasOptional,
    /// `requiredTxGas` is available for gas estimation
    RequiredTxGas,
    /// `simulateAndRevert` is available
    SimulateAndRevert,
    /// ERC-4337 module support
    AccountAbstraction,
    /// SafeL2 event-emitting singletons are deployed
    SafeL2Contracts,
}

impl SafeFeature {
    fn requirement(&self) -> &'static str {
        match self {
            SafeFeature::Eip712ChainId => ">=1.3.0",
            SafeFeature::EthSign => ">=1.1.0",
            SafeFeature::SafeFallbackHandler => ">=1.1.1",
            SafeFeature::SafeTxGasOptional => ">=1.3.0",
            SafeFeature::RequiredTxGas => "<=1.2.0",
            SafeFeature::SimulateAndRevert => ">=1.3.0",
            SafeFeature::AccountAbstraction => ">=1.3.0",
            SafeFeature::SafeL2Contracts => ">=1.3.0",
        }
    }
}

/// Checks whether `version` satisfies the version requirement of `feature`
pub fn has_safe_feature(feature: SafeFeature, version: SafeVersion) -> bool {
    // requirement strings are static and well formed
    VersionReq::parse(feature.requirement())
        .map(|req| req.matches(&version.semver()))
        .unwrap_or(false)
}
