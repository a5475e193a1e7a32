//! Encoding utilities for Safe transactions and messages

mod eip712;
mod multisend;

pub use eip712::{
    compute_safe_message_struct_hash, compute_safe_tx_hash, compute_transaction_hash,
    encode_typed_preimage, hash_message, hash_safe_message, hash_transaction,
    preimage_safe_message_hash, preimage_safe_transaction_hash, MessagePayload, SafeDomain,
    SafeTxParams,
};
pub use multisend::{decode_multisend_data, encode_multisend_data, encode_transaction};
