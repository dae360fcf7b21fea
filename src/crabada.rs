//! Crabada contract client
//!
//! Binds the IdleGame contract (configured address + bundled ABI) and
//! exposes the team-management action on top of the generic sender.

use crate::config::Settings;
use crate::error::{ClientError, ClientResult};
use crate::tx::TransactionSender;

use ethers::abi::Abi;
use ethers::contract::BaseContract;
use ethers::providers::{Http, JsonRpcClient};
use ethers::types::{Bytes, TransactionReceipt, U256};
use tracing::debug;

/// Contract interface document, bundled with the binary.
const CRABADA_ABI: &str = include_str!("../abi/crabada.json");

/// Client bound to the Crabada IdleGame contract
pub struct CrabadaClient<P> {
    sender: TransactionSender<P>,
    contract: BaseContract,
}

impl CrabadaClient<Http> {
    pub async fn connect(settings: Settings) -> ClientResult<Self> {
        let sender = TransactionSender::connect(settings).await?;
        Self::new(sender)
    }
}

impl<P: JsonRpcClient> CrabadaClient<P> {
    pub fn new(sender: TransactionSender<P>) -> ClientResult<Self> {
        let abi: Abi = serde_json::from_str(CRABADA_ABI)
            .map_err(|e| ClientError::Config(format!("Malformed contract ABI: {e}")))?;

        Ok(Self {
            sender,
            contract: BaseContract::from(abi),
        })
    }

    /// ABI-encode `removeCrabadaFromTeam(teamId, position)`
    fn encode_remove(&self, team_id: u64, position: u64) -> ClientResult<Bytes> {
        self.contract
            .encode(
                "removeCrabadaFromTeam",
                (U256::from(team_id), U256::from(position)),
            )
            .map_err(|e| ClientError::Config(format!("ABI encoding failed: {e}")))
    }

    /// Remove the crabada at `position` from `team_id`.
    ///
    /// Builds, signs, broadcasts and confirms the call. Failures stay
    /// typed: node rejection, transport fault, on-chain revert and
    /// confirmation timeout each surface as their own error kind.
    pub async fn remove_crabada_from_team(
        &self,
        team_id: u64,
        position: u64,
    ) -> ClientResult<TransactionReceipt> {
        let calldata = self.encode_remove(team_id, position)?;
        let tx = self.sender.build_contract_call(calldata).await?;
        debug!(?tx, "Built removeCrabadaFromTeam transaction");
        self.sender.send(&tx).await
    }
}
