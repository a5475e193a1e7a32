//! Human-readable ABIs of every contract, per Safe version
//!
//! Each entry is parsed into an [`alloy::json_abi::Function`] when a contract is
//! resolved; the resulting name-indexed table is what the adapter encodes and
//! decodes with.

use crate::chain::ContractKind;
use crate::version::SafeVersion;

const SAFE_COMMON: &[&str] = &[
    "function VERSION() returns (string)",
    "function execTransaction(address to, uint256 value, bytes data, uint8 operation, uint256 safeTxGas, uint256 baseGas, uint256 gasPrice, address gasToken, address refundReceiver, bytes signatures) returns (bool)",
    "function execTransactionFromModule(address to, uint256 value, bytes data, uint8 operation) returns (bool)",
    "function approveHash(bytes32 hashToApprove)",
    "function approvedHashes(address owner, bytes32 hash) returns (uint256)",
    "function signedMessages(bytes32 hash) returns (uint256)",
    "function nonce() returns (uint256)",
    "function getThreshold() returns (uint256)",
    "function getOwners() returns (address[])",
    "function isOwner(address owner) returns (bool)",
    "function addOwnerWithThreshold(address owner, uint256 threshold)",
    "function removeOwner(address prevOwner, address owner, uint256 threshold)",
    "function swapOwner(address prevOwner, address oldOwner, address newOwner)",
    "function changeThreshold(uint256 threshold)",
    "function enableModule(address module)",
    "function disableModule(address prevModule, address module)",
    "function isModuleEnabled(address module) returns (bool)",
    "function domainSeparator() returns (bytes32)",
    "function getTransactionHash(address to, uint256 value, bytes data, uint8 operation, uint256 safeTxGas, uint256 baseGas, uint256 gasPrice, address gasToken, address refundReceiver, uint256 nonce) returns (bytes32)",
    "function encodeTransactionData(address to, uint256 value, bytes data, uint8 operation, uint256 safeTxGas, uint256 baseGas, uint256 gasPrice, address gasToken, address refundReceiver, uint256 nonce) returns (bytes)",
];

const SAFE_SETUP_V1_0_0: &str = "function setup(address[] owners, uint256 threshold, address to, bytes data, address paymentToken, uint256 payment, address paymentReceiver)";

const SAFE_SETUP: &str = "function setup(address[] owners, uint256 threshold, address to, bytes data, address fallbackHandler, address paymentToken, uint256 payment, address paymentReceiver)";

/// Singleton methods removed in 1.3.0
const SAFE_LEGACY: &[&str] = &[
    "function NAME() returns (string)",
    "function getModules() returns (address[])",
    "function getMessageHash(bytes message) returns (bytes32)",
    "function signMessage(bytes data)",
    "function requiredTxGas(address to, uint256 value, bytes data, uint8 operation) returns (uint256)",
];

/// Singleton methods added in 1.1.x
const SAFE_SINCE_1_1: &[&str] = &[
    "function setFallbackHandler(address handler)",
    "function getModulesPaginated(address start, uint256 pageSize) returns (address[], address)",
    "function getStorageAt(uint256 offset, uint256 length) returns (bytes)",
    "function checkSignatures(bytes32 dataHash, bytes data, bytes signatures)",
    "function execTransactionFromModuleReturnData(address to, uint256 value, bytes data, uint8 operation) returns (bool, bytes)",
];

/// Singleton methods added in 1.3.0
const SAFE_SINCE_1_3: &[&str] = &[
    "function getChainId() returns (uint256)",
    "function setGuard(address guard)",
    "function checkNSignatures(bytes32 dataHash, bytes data, bytes signatures, uint256 requiredSignatures)",
    "function simulateAndRevert(address targetContract, bytes calldataPayload)",
];

const FACTORY_V1_0_0: &[&str] = &[
    "function createProxy(address masterCopy, bytes data) returns (address)",
    "function createProxyWithNonce(address masterCopy, bytes initializer, uint256 saltNonce) returns (address)",
    "function proxyCreationCode() returns (bytes)",
    "function proxyRuntimeCode() returns (bytes)",
];

const FACTORY_SINCE_1_1: &[&str] = &[
    "function calculateCreateProxyWithNonceAddress(address singleton, bytes initializer, uint256 saltNonce) returns (address)",
    "function createProxyWithCallback(address singleton, bytes initializer, uint256 saltNonce, address callback) returns (address)",
];

const FACTORY_V1_4_1: &[&str] = &[
    "function createProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce) returns (address)",
    "function createChainSpecificProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce) returns (address)",
    "function createProxyWithCallback(address singleton, bytes initializer, uint256 saltNonce, address callback) returns (address)",
    "function proxyCreationCode() returns (bytes)",
    "function getChainId() returns (uint256)",
];

const MULTI_SEND: &[&str] = &["function multiSend(bytes transactions)"];

/// Token callbacks shared by DefaultCallbackHandler (1.1.1, 1.2.0) and
/// CompatibilityFallbackHandler
const TOKEN_CALLBACKS: &[&str] = &[
    "function onERC1155Received(address operator, address from, uint256 id, uint256 value, bytes data) returns (bytes4)",
    "function onERC1155BatchReceived(address operator, address from, uint256[] ids, uint256[] values, bytes data) returns (bytes4)",
    "function onERC721Received(address operator, address from, uint256 tokenId, bytes data) returns (bytes4)",
    "function tokensReceived(address operator, address from, address to, uint256 amount, bytes userData, bytes operatorData)",
    "function supportsInterface(bytes4 interfaceId) returns (bool)",
    "function NAME() returns (string)",
    "function VERSION() returns (string)",
];

const FALLBACK_HANDLER_SINCE_1_3: &[&str] = &[
    "function getMessageHash(bytes message) returns (bytes32)",
    "function getMessageHashForSafe(address safe, bytes message) returns (bytes32)",
    "function isValidSignature(bytes32 hash, bytes signature) returns (bytes4)",
    "function simulate(address targetContract, bytes calldataPayload) returns (bytes)",
];

const SIGN_MESSAGE_LIB: &[&str] = &[
    "function signMessage(bytes data)",
    "function getMessageHash(bytes message) returns (bytes32)",
];

/// Returns the method signatures `kind` exposes at `version`
///
/// An empty list means the contract does not exist for that version.
pub fn method_signatures(kind: ContractKind, version: SafeVersion) -> Vec<&'static str> {
    let legacy = version < SafeVersion::V1_3_0;
    let mut methods = Vec::new();

    match kind {
        ContractKind::Safe => {
            methods.extend_from_slice(SAFE_COMMON);
            if version == SafeVersion::V1_0_0 {
                methods.push(SAFE_SETUP_V1_0_0);
            } else {
                methods.push(SAFE_SETUP);
                methods.extend_from_slice(SAFE_SINCE_1_1);
            }
            if legacy {
                methods.extend_from_slice(SAFE_LEGACY);
            } else {
                methods.extend_from_slice(SAFE_SINCE_1_3);
            }
        }
        ContractKind::SafeProxyFactory => match version {
            SafeVersion::V1_0_0 => methods.extend_from_slice(FACTORY_V1_0_0),
            SafeVersion::V1_4_1 => methods.extend_from_slice(FACTORY_V1_4_1),
            _ => {
                methods.extend_from_slice(FACTORY_V1_0_0);
                methods.extend_from_slice(FACTORY_SINCE_1_1);
            }
        },
        ContractKind::MultiSend => methods.extend_from_slice(MULTI_SEND),
        ContractKind::MultiSendCallOnly if !legacy => methods.extend_from_slice(MULTI_SEND),
        ContractKind::CompatibilityFallbackHandler if version != SafeVersion::V1_0_0 => {
            methods.extend_from_slice(TOKEN_CALLBACKS);
            if !legacy {
                methods.extend_from_slice(FALLBACK_HANDLER_SINCE_1_3);
            }
        }
        ContractKind::SignMessageLib if !legacy => methods.extend_from_slice(SIGN_MESSAGE_LIB),
        _ => {}
    }

    methods
}
