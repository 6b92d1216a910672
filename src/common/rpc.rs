//! Ledger RPC seam.
//!
//! The swap-and-pay flow only needs five network operations; they are
//! abstracted behind [`LedgerRpc`] so the submitter and endpoint selector can
//! run against a scripted mock connection in tests. The production
//! implementation wraps the nonblocking [`SolanaRpcClient`].

use async_trait::async_trait;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{hash::Hash, signature::Signature, transaction::VersionedTransaction};

use super::types::{AnyResult, SolanaRpcClient};

/// Observed disposition of a submitted signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Not yet visible at the target commitment level
    Pending,
    /// Reached the target commitment level without error
    Confirmed,
    /// Landed, but the runtime reported an execution error
    Failed(String),
}

/// The ledger operations consumed by the swap-and-pay flow.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Endpoint URL, for log output.
    fn url(&self) -> String;

    /// Current slot; doubles as the liveness probe.
    async fn get_slot(&self) -> AnyResult<u64>;

    /// Latest blockhash and its last-valid block height.
    async fn latest_blockhash(&self) -> AnyResult<(Hash, u64)>;

    /// Current block height, used to bound confirmation polling.
    async fn block_height(&self) -> AnyResult<u64>;

    /// Broadcast a signed transaction with preflight checks enabled.
    async fn send_transaction(&self, transaction: &VersionedTransaction) -> AnyResult<Signature>;

    /// Poll the status of a previously broadcast signature.
    async fn signature_status(&self, signature: &Signature) -> AnyResult<SignatureStatus>;
}

#[async_trait]
impl LedgerRpc for SolanaRpcClient {
    fn url(&self) -> String {
        SolanaRpcClient::url(self)
    }

    async fn get_slot(&self) -> AnyResult<u64> {
        Ok(SolanaRpcClient::get_slot(self).await?)
    }

    async fn latest_blockhash(&self) -> AnyResult<(Hash, u64)> {
        let (blockhash, last_valid_block_height) =
            self.get_latest_blockhash_with_commitment(self.commitment()).await?;
        Ok((blockhash, last_valid_block_height))
    }

    async fn block_height(&self) -> AnyResult<u64> {
        Ok(SolanaRpcClient::get_block_height(self).await?)
    }

    async fn send_transaction(&self, transaction: &VersionedTransaction) -> AnyResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(self.commitment().commitment),
            ..RpcSendTransactionConfig::default()
        };
        Ok(self.send_transaction_with_config(transaction, config).await?)
    }

    async fn signature_status(&self, signature: &Signature) -> AnyResult<SignatureStatus> {
        let response = self.get_signature_statuses(&[*signature]).await?;
        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(SignatureStatus::Pending),
        };
        if let Some(err) = status.err {
            return Ok(SignatureStatus::Failed(err.to_string()));
        }
        if status.satisfies_commitment(self.commitment()) {
            Ok(SignatureStatus::Confirmed)
        } else {
            Ok(SignatureStatus::Pending)
        }
    }
}
