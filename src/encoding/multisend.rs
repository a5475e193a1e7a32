//! MultiSend transaction encoding
//!
//! The MultiSend contract expects transactions to be encoded in a packed format:
//! - operation: 1 byte (0 = Call, 1 = DelegateCall)
//! - to: 20 bytes
//! - value: 32 bytes
//! - data length: 32 bytes
//! - data: variable length

use alloy::primitives::{Address, Bytes, U256};

use crate::error::{Error, Result};
use crate::types::{Call, Operation, SafeCall};

const HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// Encodes a single transaction for MultiSend packed format
pub fn encode_transaction(call: &impl SafeCall) -> Vec<u8> {
    let data = call.data();
    let mut encoded = Vec::with_capacity(HEADER_LEN + data.len());

    encoded.push(call.operation().as_u8());
    encoded.extend_from_slice(call.to().as_slice());
    encoded.extend_from_slice(&call.value().to_be_bytes::<32>());
    encoded.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
    encoded.extend_from_slice(&data);

    encoded
}

/// Encodes multiple transactions for MultiSend
pub fn encode_multisend_data(calls: &[impl SafeCall]) -> Bytes {
    let mut encoded = Vec::new();

    for call in calls {
        encoded.extend(encode_transaction(call));
    }

    Bytes::from(encoded)
}

/// Splits packed MultiSend data back into calls
pub fn decode_multisend_data(data: &[u8]) -> Result<Vec<Call>> {
    let mut calls = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        if rest.len() < HEADER_LEN {
            return Err(Error::Abi(format!(
                "truncated multisend entry: {} header bytes left",
                rest.len()
            )));
        }

        let operation = Operation::try_from(rest[0])?;
        let to = Address::from_slice(&rest[1..21]);
        let value = U256::from_be_slice(&rest[21..53]);
        let data_len = U256::from_be_slice(&rest[53..HEADER_LEN]);

        let available = rest.len() - HEADER_LEN;
        if data_len > U256::from(available) {
            return Err(Error::Abi(format!(
                "multisend entry declares {data_len} data bytes, {available} available"
            )));
        }
        let data_len = data_len.to::<usize>();
        let payload = &rest[HEADER_LEN..HEADER_LEN + data_len];

        calls.push(Call::new(to, value, payload.to_vec()).with_operation(operation));
        rest = &rest[HEADER_LEN + data_len..];
    }

    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_encode_single_transaction() {
        let call = Call::new(
            address!("0x1234567890123456789012345678901234567890"),
            U256::from(1000),
            vec![0xa9, 0x05, 0x9c, 0xbb],
        );

        let encoded = encode_transaction(&call);

        assert_eq!(encoded[0], 0);
        assert_eq!(
            &encoded[1..21],
            address!("0x1234567890123456789012345678901234567890").as_slice()
        );
        // 1000 = 0x3e8
        assert_eq!(encoded[51], 0x03);
        assert_eq!(encoded[52], 0xe8);
        assert_eq!(encoded[84], 4);
        assert_eq!(&encoded[85..], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_encode_delegate_call() {
        let call = Call::delegate_call(
            address!("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd"),
            vec![0x01, 0x02],
        );

        assert_eq!(encode_transaction(&call)[0], 1);
    }

    #[test]
    fn test_decode_multisend_data() {
        let calls = vec![
            Call::call(address!("0x1111111111111111111111111111111111111111"), vec![0x01]),
            Call::delegate_call(address!("0x2222222222222222222222222222222222222222"), vec![]),
            Call::new(
                address!("0x3333333333333333333333333333333333333333"),
                U256::from(5),
                vec![0xaa; 40],
            ),
        ];

        let encoded = encode_multisend_data(&calls);
        assert_eq!(encoded.len(), 86 + 85 + 125);

        assert_eq!(decode_multisend_data(&encoded).unwrap(), calls);
    }

    #[test]
    fn test_decode_truncated_data_fails() {
        let calls = vec![Call::call(
            address!("0x1111111111111111111111111111111111111111"),
            vec![0x01, 0x02, 0x03],
        )];
        let encoded = encode_multisend_data(&calls);

        assert!(decode_multisend_data(&encoded[..encoded.len() - 1]).is_err());
        assert!(decode_multisend_data(&encoded[..40]).is_err());
    }

    #[test]
    fn test_decode_invalid_operation_fails() {
        let mut encoded = encode_transaction(&Call::call(Address::ZERO, vec![]));
        encoded[0] = 2;

        assert!(decode_multisend_data(&encoded).is_err());
    }
}
