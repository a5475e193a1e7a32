//! Contract interfaces, EIP-712 type hashes and the versioned contract adapter

mod abi;
mod adapter;

pub use abi::method_signatures;
pub use adapter::{AbiSource, ContractAdapter, UnresolvedContract, WriteOutcome};

use alloy::primitives::{b256, B256};
use alloy::sol;

sol! {
    /// Safe singleton interface (stable across 1.0.0 - 1.4.1)
    #[sol(rpc)]
    interface ISafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address payable refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);

        function approveHash(bytes32 hashToApprove) external;

        function nonce() external view returns (uint256 nonce);

        function getThreshold() external view returns (uint256 threshold);

        function getOwners() external view returns (address[] memory owners);

        function isOwner(address owner) external view returns (bool isOwner);

        function getTransactionHash(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) external view returns (bytes32);
    }

    /// `setup` from Safe 1.1.1 onwards, with a fallback handler
    interface ISafeSetup {
        function setup(
            address[] calldata _owners,
            uint256 _threshold,
            address to,
            bytes calldata data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address payable paymentReceiver
        ) external;
    }

    /// `setup` of Safe 1.0.0, which predates fallback handlers
    interface ISafeSetupV1_0_0 {
        function setup(
            address[] calldata _owners,
            uint256 _threshold,
            address to,
            bytes calldata data,
            address paymentToken,
            uint256 payment,
            address payable paymentReceiver
        ) external;
    }

    /// Proxy factory calls shared by every version
    #[sol(rpc)]
    interface ISafeProxyFactory {
        function createProxyWithNonce(
            address _singleton,
            bytes memory initializer,
            uint256 saltNonce
        ) external returns (address proxy);

        function proxyCreationCode() external pure returns (bytes memory);
    }

    /// MultiSend: packed batch of calls, executed via delegatecall
    #[sol(rpc)]
    interface IMultiSend {
        /// @param transactions operation (1) | to (20) | value (32) | data length (32) | data
        function multiSend(bytes memory transactions) external payable;
    }

    /// MultiSendCallOnly: same packing, rejects DelegateCall entries
    #[sol(rpc)]
    interface IMultiSendCallOnly {
        function multiSend(bytes memory transactions) external payable;
    }

    /// ERC20 interface for common token operations
    #[sol(rpc)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)")
pub const SAFE_TX_TYPEHASH: B256 =
    b256!("0xbb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8");

/// keccak256("EIP712Domain(uint256 chainId,address verifyingContract)"), Safe >= 1.3.0
pub const DOMAIN_SEPARATOR_TYPEHASH: B256 =
    b256!("0x47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218");

/// keccak256("EIP712Domain(address verifyingContract)"), Safe < 1.3.0
pub const DOMAIN_SEPARATOR_TYPEHASH_LEGACY: B256 =
    b256!("0x035aff83d86937d35b32e04f0ddc6ff469290eef2f1b692d8a815c89404d4749");

/// keccak256("SafeMessage(bytes message)")
pub const SAFE_MSG_TYPEHASH: B256 =
    b256!("0x60b3cbf8b4a223d68d641b3b6ddf9a298e7f33710cf3d3a9d1146b5a6150fbca");
