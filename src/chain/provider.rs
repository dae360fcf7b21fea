//! Chain provider wrapping the connection to the remote JSON-RPC node
//!
//! Generic over the underlying transport so tests can substitute a mock.

use crate::config::{GasPriceStrategy, Settings};
use crate::error::{ClientError, ClientResult};
use crate::tx::gas::{eip1559_max_fee, gwei_to_wei};

use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{BlockNumber, Bytes, TransactionReceipt, TxHash, U256};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

/// How often to poll for a transaction receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How long to wait for confirmation before giving up.
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Single-chain provider with typed error mapping
pub struct ChainProvider<P> {
    inner: Provider<P>,
    settings: Settings,
}

impl ChainProvider<Http> {
    /// Connect to the configured RPC endpoint and verify the node is
    /// reachable and on the expected chain. Fatal on failure.
    pub async fn connect(settings: Settings) -> ClientResult<Self> {
        let inner = Provider::<Http>::try_from(settings.rpc_url.as_str())
            .map_err(|e| ClientError::Connection(format!("Invalid RPC URL: {e}")))?;

        let provider = Self::new(inner, settings);
        provider.check_connection().await?;
        info!(
            chain_id = provider.settings.chain_id,
            "Connected to {}", provider.settings.rpc_url
        );
        Ok(provider)
    }
}

impl<P: JsonRpcClient> ChainProvider<P> {
    /// Wrap an existing provider (used by tests with a mock transport)
    pub fn new(inner: Provider<P>, settings: Settings) -> Self {
        Self { inner, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn check_connection(&self) -> ClientResult<()> {
        let chain_id = self
            .inner
            .get_chainid()
            .await
            .map_err(|e| ClientError::Connection(format!("Node unreachable: {e}")))?;

        if chain_id != U256::from(self.settings.chain_id) {
            return Err(ClientError::Connection(format!(
                "Node reports chain id {chain_id}, expected {}",
                self.settings.chain_id
            )));
        }
        Ok(())
    }

    /// Fetch the account's next nonce from the node.
    ///
    /// Called fresh on every transaction build, never cached. This is the
    /// only nonce sequencing; concurrent senders on the same account are
    /// unsupported.
    pub async fn next_nonce(&self) -> ClientResult<U256> {
        let nonce = self
            .inner
            .get_transaction_count(self.settings.user_address, None)
            .await
            .map_err(|e| ClientError::Connection(format!("Nonce lookup failed: {e}")))?;

        debug!("Nonce for {:?}: {nonce}", self.settings.user_address);
        Ok(nonce)
    }

    /// Get the current gas price per the configured strategy
    pub async fn current_gas_price(&self) -> ClientResult<GasPrice> {
        match self.settings.gas_price_strategy {
            GasPriceStrategy::Legacy => {
                let price = self
                    .inner
                    .get_gas_price()
                    .await
                    .map_err(|e| ClientError::Connection(format!("Gas price lookup: {e}")))?;
                Ok(GasPrice::Legacy(price))
            }
            GasPriceStrategy::Eip1559 => {
                let base_fee = self.latest_base_fee().await?;
                let priority_fee = gwei_to_wei(self.settings.max_priority_fee_per_gas_gwei);
                Ok(GasPrice::Eip1559 {
                    max_fee_per_gas: eip1559_max_fee(base_fee, priority_fee),
                    max_priority_fee_per_gas: priority_fee,
                })
            }
        }
    }

    async fn latest_base_fee(&self) -> ClientResult<U256> {
        let block = self
            .inner
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| ClientError::Connection(format!("Base fee lookup: {e}")))?
            .ok_or_else(|| ClientError::Connection("No latest block".to_string()))?;

        block
            .base_fee_per_gas
            .ok_or_else(|| ClientError::Connection("No base fee in latest block".to_string()))
    }

    /// Estimate gas by dry-run simulation against the node
    pub async fn estimate_gas(&self, tx: &TypedTransaction) -> ClientResult<U256> {
        self.inner
            .estimate_gas(tx, None)
            .await
            .map_err(|e| ClientError::Connection(format!("Gas estimation failed: {e}")))
    }

    /// Broadcast a signed transaction, returning its hash.
    ///
    /// Irreversible: the fee is spent even if the call later reverts.
    pub async fn send_raw(&self, raw: Bytes) -> ClientResult<TxHash> {
        let pending = self
            .inner
            .send_raw_transaction(raw)
            .await
            .map_err(|e| ClientError::Broadcast(e.to_string()))?;

        Ok(pending.tx_hash())
    }

    /// Poll until the node reports the transaction mined, or time out.
    ///
    /// Returns the receipt as reported, including failure status; callers
    /// decide what a reverted receipt means.
    pub async fn await_receipt(&self, tx_hash: TxHash) -> ClientResult<TransactionReceipt> {
        let poll = async {
            loop {
                let receipt = self
                    .inner
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(|e| ClientError::Connection(format!("Receipt lookup: {e}")))?;

                if let Some(receipt) = receipt {
                    return Ok(receipt);
                }
                sleep(RECEIPT_POLL_INTERVAL).await;
            }
        };

        match timeout(RECEIPT_TIMEOUT, poll).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout {
                operation: format!("confirmation of {tx_hash:?}"),
            }),
        }
    }
}

/// Gas price types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasPrice {
    Legacy(U256),
    Eip1559 {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasPriceStrategy;
    use ethers::providers::MockProvider;
    use ethers::types::{Block, H256};

    fn test_settings(strategy: GasPriceStrategy) -> Settings {
        Settings {
            rpc_url: "http://localhost:8545".to_string(),
            user_address: "0x000000000000000000000000000000000000dEaD"
                .parse()
                .unwrap(),
            user_private_key:
                "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
            contract_address: "0x82a85407bd612f52577909f4a58bfc6873f14da8"
                .parse()
                .unwrap(),
            chain_id: 43114,
            gas_limit: 400_000,
            max_priority_fee_per_gas_gwei: 2,
            gas_price_strategy: strategy,
        }
    }

    fn mocked(strategy: GasPriceStrategy) -> (ChainProvider<MockProvider>, MockProvider) {
        let (inner, mock) = Provider::mocked();
        (ChainProvider::new(inner, test_settings(strategy)), mock)
    }

    #[tokio::test]
    async fn eip1559_fee_is_twice_base_plus_priority() {
        let (provider, mock) = mocked(GasPriceStrategy::Eip1559);

        let mut block: Block<H256> = Block::default();
        block.base_fee_per_gas = Some(U256::from(25_000_000_000u64)); // 25 gwei
        mock.push(block).unwrap();

        let price = provider.current_gas_price().await.unwrap();
        assert_eq!(
            price,
            GasPrice::Eip1559 {
                max_fee_per_gas: U256::from(52_000_000_000u64),
                max_priority_fee_per_gas: U256::from(2_000_000_000u64),
            }
        );
    }

    #[tokio::test]
    async fn legacy_strategy_uses_gas_price_oracle() {
        let (provider, mock) = mocked(GasPriceStrategy::Legacy);
        mock.push(U256::from(30_000_000_000u64)).unwrap();

        let price = provider.current_gas_price().await.unwrap();
        assert_eq!(price, GasPrice::Legacy(U256::from(30_000_000_000u64)));
    }

    #[tokio::test]
    async fn nonce_fetched_fresh_on_every_call() {
        let (provider, mock) = mocked(GasPriceStrategy::Eip1559);

        // Mock responses pop LIFO: first call sees 7, second sees 8.
        mock.push(U256::from(8)).unwrap();
        mock.push(U256::from(7)).unwrap();

        assert_eq!(provider.next_nonce().await.unwrap(), U256::from(7));
        assert_eq!(provider.next_nonce().await.unwrap(), U256::from(8));
    }

    #[tokio::test]
    async fn await_receipt_returns_mined_receipt() {
        let (provider, mock) = mocked(GasPriceStrategy::Eip1559);

        let mut receipt = TransactionReceipt::default();
        receipt.transaction_hash = H256::repeat_byte(0xab);
        receipt.status = Some(1u64.into());
        mock.push(receipt.clone()).unwrap();

        let got = provider
            .await_receipt(H256::repeat_byte(0xab))
            .await
            .unwrap();
        assert_eq!(got, receipt);
    }

    #[tokio::test]
    async fn transport_fault_surfaces_as_connection_error() {
        let (provider, _mock) = mocked(GasPriceStrategy::Eip1559);

        // No responses queued: the mock transport errors out.
        let err = provider.next_nonce().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }
}
