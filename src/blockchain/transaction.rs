//! Native transfer building, signing and submission.
//!
//! # Responsibilities
//! - Build transfers with nonce sync and gas price protection
//! - Sign and broadcast
//!
//! Submission returns the hash only. Confirmation is never awaited, so a
//! balance read straight after `send_transfer` may not reflect the transfer.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Transaction builder for native transfers.
pub struct TxBuilder<'a> {
    client: &'a BlockchainClient,
    wallet: &'a Wallet,
}

impl<'a> TxBuilder<'a> {
    pub fn new(client: &'a BlockchainClient, wallet: &'a Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build an unsigned transfer of `value` wei to `to`.
    pub async fn build_transfer(&self, to: Address, value: U256) -> BlockchainResult<TransactionRequest> {
        // Get current nonce from chain and sync wallet
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);

        let gas_price = self.client.get_gas_price().await?;
        let gas_price = adjusted_gas_price(
            gas_price,
            self.client.config().gas_price_multiplier,
            self.client.config().max_gas_price_gwei,
        )?;

        let nonce = self.wallet.get_and_increment_nonce();

        let tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_value(value)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(TRANSFER_GAS_LIMIT);

        Ok(tx)
    }

    /// Build, sign and broadcast a transfer.
    pub async fn send_transfer(&self, to: Address, value: U256) -> BlockchainResult<TxHash> {
        let tx = self.build_transfer(to, value).await?;
        let envelope = tx
            .build(&self.wallet.network_wallet())
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Transaction signing failed: {}", e)))?;

        let tx_hash = self.client.send_envelope(envelope).await?;
        tracing::info!(tx_hash = %tx_hash, to = %to, value = %value, "Transfer submitted");
        Ok(tx_hash)
    }
}

/// Apply the safety multiplier to the node's gas price, rejecting spikes
/// above `max_gwei`.
pub fn adjusted_gas_price(gas_price: u128, multiplier: f64, max_gwei: u64) -> BlockchainResult<u128> {
    let gas_price_gwei = gas_price / 1_000_000_000;
    if gas_price_gwei > max_gwei as u128 {
        return Err(BlockchainError::GasPriceTooHigh {
            current_gwei: gas_price_gwei as u64,
            max_gwei,
        });
    }
    Ok((gas_price as f64 * multiplier) as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_price_multiplier() {
        let price = adjusted_gas_price(10_000_000_000, 1.5, 500).unwrap();
        assert_eq!(price, 15_000_000_000);
    }

    #[test]
    fn test_gas_price_cap() {
        let err = adjusted_gas_price(600_000_000_000, 1.0, 500).unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::GasPriceTooHigh { current_gwei: 600, max_gwei: 500 }
        ));
    }
}
