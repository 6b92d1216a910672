//! Swap transaction construction via the Jupiter swap API.
//!
//! The aggregator assembles the full on-chain program invocation; this module
//! only shapes the request and hands back the opaque base64 payload for the
//! submitter.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::{JupiterApiClient, QuoteResponse};
use crate::common::error::SwapPayError;
use crate::constants::swap::DEFAULT_MAX_PRIORITY_FEE_LAMPORTS;

/// Execution preferences forwarded to the swap-build endpoint.
#[derive(Debug, Clone)]
pub struct SwapExecutionPrefs {
    /// Auto-wrap/unwrap native SOL around the swap
    pub wrap_and_unwrap_sol: bool,
    /// Route through the aggregator's shared intermediate accounts
    pub use_shared_accounts: bool,
    /// Let the aggregator size the compute budget
    pub dynamic_compute_unit_limit: bool,
    /// Let the aggregator tighten slippage per route
    pub dynamic_slippage: bool,
    /// Cap on the prioritization fee (lamports)
    pub max_priority_fee_lamports: u64,
    /// Priority level label, e.g. `high`
    pub priority_level: String,
}

impl Default for SwapExecutionPrefs {
    fn default() -> Self {
        Self {
            wrap_and_unwrap_sol: true,
            use_shared_accounts: true,
            dynamic_compute_unit_limit: true,
            dynamic_slippage: true,
            max_priority_fee_lamports: DEFAULT_MAX_PRIORITY_FEE_LAMPORTS,
            priority_level: "high".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriorityLevelWithMaxLamports {
    max_lamports: u64,
    priority_level: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrioritizationFeeLamports {
    priority_level_with_max_lamports: PriorityLevelWithMaxLamports,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapTransactionRequest<'a> {
    quote_response: &'a QuoteResponse,
    user_public_key: String,
    destination_token_account: String,
    wrap_and_unwrap_sol: bool,
    use_shared_accounts: bool,
    dynamic_compute_unit_limit: bool,
    dynamic_slippage: bool,
    prioritization_fee_lamports: PrioritizationFeeLamports,
}

/// Response of `POST /v6/swap`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapTransactionResponse {
    /// Base64-encoded unsigned transaction
    #[serde(rename = "swapTransaction", default)]
    pub swap_transaction: Option<String>,
    #[serde(rename = "lastValidBlockHeight", default)]
    pub last_valid_block_height: Option<u64>,
}

impl JupiterApiClient {
    /// Request a ready-to-sign transaction implementing the quoted swap plus
    /// a transfer of the output into `destination_token_account`.
    ///
    /// Fails with [`SwapPayError::SwapBuildFailed`] when the upstream call
    /// errors or returns no payload.
    pub async fn build_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user_public_key: &Pubkey,
        destination_token_account: &Pubkey,
        prefs: &SwapExecutionPrefs,
    ) -> Result<String, SwapPayError> {
        let body = SwapTransactionRequest {
            quote_response: quote,
            user_public_key: user_public_key.to_string(),
            destination_token_account: destination_token_account.to_string(),
            wrap_and_unwrap_sol: prefs.wrap_and_unwrap_sol,
            use_shared_accounts: prefs.use_shared_accounts,
            dynamic_compute_unit_limit: prefs.dynamic_compute_unit_limit,
            dynamic_slippage: prefs.dynamic_slippage,
            prioritization_fee_lamports: PrioritizationFeeLamports {
                priority_level_with_max_lamports: PriorityLevelWithMaxLamports {
                    max_lamports: prefs.max_priority_fee_lamports,
                    priority_level: prefs.priority_level.clone(),
                },
            },
        };

        let url = Self::endpoint(&self.config.quote_host, "/v6/swap");

        self.count_request();
        let response = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapPayError::SwapBuildFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| SwapPayError::SwapBuildFailed(e.to_string()))?;

        let swap: SwapTransactionResponse = response
            .json()
            .await
            .map_err(|e| SwapPayError::SwapBuildFailed(e.to_string()))?;

        match swap.swap_transaction {
            Some(payload) if !payload.is_empty() => Ok(payload),
            _ => Err(SwapPayError::SwapBuildFailed(
                "upstream returned no swap transaction payload".to_string(),
            )),
        }
    }
}
