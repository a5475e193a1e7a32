//! Network capability consumed by contract reads and writes
//!
//! The core never constructs a provider. Callers inject anything implementing
//! [`Transport`]; [`RpcTransport`] adapts an alloy [`Provider`].

use std::future::Future;

use alloy::network::primitives::ReceiptResponse;
use alloy::network::{AnyNetwork, Network, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;

use crate::error::{Error, Result};

/// Result of submitting a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Whether the transaction succeeded (not just inclusion)
    pub success: bool,
}

/// Read and write access to the chain
pub trait Transport: Send + Sync {
    /// Executes an `eth_call` against `to` and returns the raw return data
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes>> + Send;

    /// Signs and submits a transaction, waiting for its receipt
    fn send_transaction(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> impl Future<Output = Result<ExecutionResult>> + Send;
}

/// [`Transport`] backed by an alloy provider with a wallet filler attached
#[derive(Debug, Clone)]
pub struct RpcTransport<P> {
    provider: P,
}

impl<P> RpcTransport<P> {
    /// Wraps a provider
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a reference to the provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P> Transport for RpcTransport<P>
where
    P: Provider<AnyNetwork> + Send + Sync,
{
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = <AnyNetwork as Network>::TransactionRequest::default()
            .with_to(to)
            .with_input(data);

        self.provider.call(tx).await.map_err(|e| Error::Fetch {
            what: "eth_call",
            reason: e.to_string(),
        })
    }

    async fn send_transaction(&self, to: Address, data: Bytes, value: U256) -> Result<ExecutionResult> {
        let tx = <AnyNetwork as Network>::TransactionRequest::default()
            .with_to(to)
            .with_value(value)
            .with_input(data);

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::ExecutionFailed {
                reason: e.to_string(),
            })?;

        let receipt = pending_tx.get_receipt().await?;

        tracing::debug!(
            tx_hash = %receipt.transaction_hash(),
            success = receipt.status(),
            "transaction mined"
        );

        Ok(ExecutionResult {
            tx_hash: receipt.transaction_hash(),
            success: receipt.status(),
        })
    }
}
