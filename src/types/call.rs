//! Call types for Safe transactions

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

use super::Operation;

/// Trait for types that can be turned into a single Safe-level call
pub trait SafeCall {
    /// Returns the target address
    fn to(&self) -> Address;

    /// Returns the value to send (in wei)
    fn value(&self) -> U256;

    /// Returns the calldata
    fn data(&self) -> Bytes;

    /// Returns the operation type (Call or DelegateCall)
    fn operation(&self) -> Operation;
}

/// A raw call with explicit to, value, data, and operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    /// Target address
    pub to: Address,
    /// Value to send
    #[serde(default)]
    pub value: U256,
    /// Calldata
    #[serde(default)]
    pub data: Bytes,
    /// Operation type
    #[serde(default)]
    pub operation: Operation,
}

impl Call {
    /// Creates a new Call with the given parameters
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value,
            data: data.into(),
            operation: Operation::Call,
        }
    }

    /// Creates a new Call with zero value
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self::new(to, U256::ZERO, data)
    }

    /// Creates a new delegate call
    pub fn delegate_call(to: Address, data: impl Into<Bytes>) -> Self {
        Self::new(to, U256::ZERO, data).with_operation(Operation::DelegateCall)
    }

    /// Sets the operation type
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Sets the value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

impl SafeCall for Call {
    fn to(&self) -> Address {
        self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn data(&self) -> Bytes {
        self.data.clone()
    }

    fn operation(&self) -> Operation {
        self.operation
    }
}

/// A typed call wrapping a `sol!` generated call type
#[derive(Debug, Clone)]
pub struct TypedCall<C: SolCall> {
    /// Target address
    pub to: Address,
    /// Value to send
    pub value: U256,
    /// The typed call data
    pub call: C,
    /// Operation type
    pub operation: Operation,
}

impl<C: SolCall> TypedCall<C> {
    /// Creates a new TypedCall
    pub fn new(to: Address, call: C) -> Self {
        Self {
            to,
            value: U256::ZERO,
            call,
            operation: Operation::Call,
        }
    }

    /// Sets the value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the operation type
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }
}

impl<C: SolCall> SafeCall for TypedCall<C> {
    fn to(&self) -> Address {
        self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn data(&self) -> Bytes {
        self.call.abi_encode().into()
    }

    fn operation(&self) -> Operation {
        self.operation
    }
}

impl<C: SolCall> From<TypedCall<C>> for Call {
    fn from(typed: TypedCall<C>) -> Self {
        Call {
            to: typed.to,
            value: typed.value,
            data: typed.data(),
            operation: typed.operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IERC20;
    use alloy::primitives::address;

    #[test]
    fn test_call_new() {
        let to = address!("0x1234567890123456789012345678901234567890");
        let value = U256::from(1000);
        let data = Bytes::from(vec![0x01, 0x02, 0x03]);

        let call = Call::new(to, value, data.clone());

        assert_eq!(call.to(), to);
        assert_eq!(call.value(), value);
        assert_eq!(call.data(), data);
        assert_eq!(call.operation(), Operation::Call);
    }

    #[test]
    fn test_call_delegate() {
        let to = address!("0x1234567890123456789012345678901234567890");
        let call = Call::delegate_call(to, vec![0x01]);

        assert_eq!(call.value(), U256::ZERO);
        assert_eq!(call.operation(), Operation::DelegateCall);
    }

    #[test]
    fn test_typed_call_into_call() {
        let token = address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
        let recipient = address!("0x2222222222222222222222222222222222222222");
        let typed = TypedCall::new(
            token,
            IERC20::transferCall {
                to: recipient,
                amount: U256::from(10_000),
            },
        );

        let call: Call = typed.into();

        assert_eq!(call.to, token);
        // transfer(address,uint256) selector
        assert_eq!(&call.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(call.data.len(), 4 + 64);
    }

    #[test]
    fn test_call_deserialize_defaults() {
        let call: Call = serde_json::from_str(
            r#"{"to":"0x1234567890123456789012345678901234567890","data":"0x01"}"#,
        )
        .unwrap();

        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.operation, Operation::Call);
        assert_eq!(call.data, Bytes::from(vec![0x01]));
    }
}
