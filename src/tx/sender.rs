//! Transaction sender: assembly, signing, broadcast and confirmation
//!
//! One transaction per call; the nonce is looked up fresh each time and
//! never cached, so a single non-concurrent sender is assumed.

use crate::chain::{ChainProvider, GasPrice};
use crate::config::Settings;
use crate::error::{ClientError, ClientResult};
use crate::tx::gas::tus_to_wei;

use ethers::providers::{Http, JsonRpcClient};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, TransactionReceipt, TransactionRequest,
};
use tracing::{debug, info};

/// Signs and submits transactions for the configured account
pub struct TransactionSender<P> {
    provider: ChainProvider<P>,
    wallet: LocalWallet,
}

impl TransactionSender<Http> {
    /// Connect to the node and load the signing wallet
    pub async fn connect(settings: Settings) -> ClientResult<Self> {
        let wallet = load_wallet(&settings)?;
        let provider = ChainProvider::connect(settings).await?;
        Ok(Self::new(provider, wallet))
    }
}

impl<P: JsonRpcClient> TransactionSender<P> {
    pub fn new(provider: ChainProvider<P>, wallet: LocalWallet) -> Self {
        Self { provider, wallet }
    }

    pub fn settings(&self) -> &Settings {
        self.provider.settings()
    }

    /// Build a transaction skeleton: type tag, chain id, configured gas
    /// limit, current fee fields and a freshly fetched nonce.
    pub async fn build_base_transaction(&self) -> ClientResult<TypedTransaction> {
        let nonce = self.provider.next_nonce().await?;
        let gas_price = self.provider.current_gas_price().await?;
        let settings = self.settings();

        let tx = match gas_price {
            GasPrice::Legacy(price) => TypedTransaction::Legacy(
                TransactionRequest::new()
                    .chain_id(settings.chain_id)
                    .nonce(nonce)
                    .gas(settings.gas_limit)
                    .gas_price(price),
            ),
            GasPrice::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => TypedTransaction::Eip1559(
                Eip1559TransactionRequest::new()
                    .chain_id(settings.chain_id)
                    .nonce(nonce)
                    .gas(settings.gas_limit)
                    .max_fee_per_gas(max_fee_per_gas)
                    .max_priority_fee_per_gas(max_priority_fee_per_gas),
            ),
        };

        Ok(tx)
    }

    /// Build a native-value transfer; gas comes from a dry-run simulation
    pub async fn build_transfer(
        &self,
        to: Address,
        amount_in_tus: u64,
    ) -> ClientResult<TypedTransaction> {
        let mut tx = self.build_base_transaction().await?;
        tx.set_from(self.settings().user_address);
        tx.set_to(to);
        tx.set_value(tus_to_wei(amount_in_tus));

        let gas = self.provider.estimate_gas(&tx).await?;
        tx.set_gas(gas);
        Ok(tx)
    }

    /// Build a contract call against the configured contract; gas is the
    /// configured ceiling, no simulation.
    pub async fn build_contract_call(&self, calldata: Bytes) -> ClientResult<TypedTransaction> {
        let mut tx = self.build_base_transaction().await?;
        tx.set_to(self.settings().contract_address);
        tx.set_data(calldata);
        Ok(tx)
    }

    /// Sign a transaction with the account's private key
    pub async fn sign(&self, tx: &TypedTransaction) -> ClientResult<Bytes> {
        let signature = self
            .wallet
            .sign_transaction(tx)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        Ok(tx.rlp_signed(&signature))
    }

    /// Sign, broadcast and wait for the receipt.
    ///
    /// A mined-but-reverted transaction is an error in its own right,
    /// distinct from node rejection and transport faults.
    pub async fn send(&self, tx: &TypedTransaction) -> ClientResult<TransactionReceipt> {
        let raw = self.sign(tx).await?;
        let tx_hash = self.provider.send_raw(raw).await?;
        info!("Transaction sent: {tx_hash:?}");

        let receipt = self.provider.await_receipt(tx_hash).await?;
        match receipt.status {
            Some(status) if status.is_zero() => Err(ClientError::Reverted { tx_hash }),
            _ => Ok(receipt),
        }
    }

    /// Transfer `amount_in_tus` TUS to `to` and wait for confirmation
    pub async fn send_tus(
        &self,
        to: Address,
        amount_in_tus: u64,
    ) -> ClientResult<TransactionReceipt> {
        let tx = self.build_transfer(to, amount_in_tus).await?;
        debug!(?tx, "Built transfer transaction");
        self.send(&tx).await
    }
}

fn load_wallet(settings: &Settings) -> ClientResult<LocalWallet> {
    let wallet = settings
        .user_private_key
        .parse::<LocalWallet>()
        .map_err(|e| ClientError::Signing(format!("Invalid private key: {e}")))?;

    Ok(wallet.with_chain_id(settings.chain_id))
}
