//! Swap quoting via the Jupiter quote API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solana_sdk::pubkey::Pubkey;

use super::JupiterApiClient;
use crate::common::error::SwapPayError;

/// Quote direction semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwapMode {
    /// `amount` is input token spent; the output floats within slippage.
    #[default]
    ExactIn,
    /// `amount` is output token received; the input floats within slippage.
    ExactOut,
}

impl SwapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapMode::ExactIn => "ExactIn",
            SwapMode::ExactOut => "ExactOut",
        }
    }
}

/// Parameters of one quote request.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// Amount in smallest units, per `swap_mode` semantics
    pub amount: u64,
    /// Slippage tolerance in basis points
    pub slippage_bps: u16,
    pub swap_mode: SwapMode,
    /// Restrict routing to highly liquid intermediate tokens
    pub restrict_intermediate_tokens: bool,
}

/// One hop of the quoted route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub amm_key: String,
    #[serde(default)]
    pub label: String,
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    pub fee_amount: String,
    pub fee_mint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanStep {
    pub swap_info: SwapInfo,
    pub percent: f64,
}

/// Quote record returned by the aggregator.
///
/// Unknown upstream fields are retained in `extra` so the record can be fed
/// back verbatim into the swap-build request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub in_amount: String,
    pub output_mint: String,
    pub out_amount: String,
    pub other_amount_threshold: String,
    pub swap_mode: String,
    pub slippage_bps: u16,
    pub price_impact_pct: String,
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(default)]
    pub context_slot: u64,
    #[serde(default)]
    pub time_taken: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JupiterApiClient {
    /// Request a swap quote.
    ///
    /// Validates the pair and amount before any network call: identical
    /// input/output mints fail with [`SwapPayError::InvalidTokenPair`], a
    /// zero amount with [`SwapPayError::InvalidAmount`].
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, SwapPayError> {
        if request.input_mint == request.output_mint {
            return Err(SwapPayError::InvalidTokenPair(request.input_mint));
        }
        if request.amount == 0 {
            return Err(SwapPayError::InvalidAmount(
                "quote amount must be a positive integer".to_string(),
            ));
        }

        let url = Self::endpoint(&self.config.quote_host, "/v6/quote");

        self.count_request();
        let response = self
            .http()
            .get(url)
            .query(&[
                ("inputMint", request.input_mint.to_string()),
                ("outputMint", request.output_mint.to_string()),
                ("amount", request.amount.to_string()),
                ("slippageBps", request.slippage_bps.to_string()),
                ("swapMode", request.swap_mode.as_str().to_string()),
                (
                    "restrictIntermediateTokens",
                    request.restrict_intermediate_tokens.to_string(),
                ),
            ])
            .send()
            .await
            .map_err(|e| SwapPayError::QuoteFetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| SwapPayError::QuoteFetchFailed(e.to_string()))?;

        response
            .json::<QuoteResponse>()
            .await
            .map_err(|e| SwapPayError::QuoteFetchFailed(e.to_string()))
    }
}
