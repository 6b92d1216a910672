//! Batched token pricing via the Jupiter price API.

use std::collections::HashMap;

use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use super::JupiterApiClient;
use crate::common::error::SwapPayError;

/// Price entry for one mint.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceData {
    pub id: String,
    #[serde(rename = "type")]
    pub price_type: String,
    /// Unit price as a decimal string
    pub price: String,
}

/// Response of `GET /price/v2`, keyed by mint address.
#[derive(Debug, Clone, Deserialize)]
pub struct PricesResponse {
    pub data: HashMap<String, PriceData>,
    #[serde(rename = "timeTaken", default)]
    pub time_taken: f64,
}

impl PricesResponse {
    /// Parsed unit price for a mint, `None` when the mint is absent or the
    /// upstream value is not numeric.
    pub fn price_of(&self, mint: &Pubkey) -> Option<f64> {
        self.data.get(&mint.to_string())?.price.parse().ok()
    }
}

impl JupiterApiClient {
    /// Fetch current unit prices for a set of mints in one batched call.
    ///
    /// The caller is expected to include both the buyer's input mint and the
    /// settlement mint so a single round trip covers the conversion.
    pub async fn get_prices(&self, mints: &[Pubkey]) -> Result<PricesResponse, SwapPayError> {
        let ids = mints.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(",");
        let url = Self::endpoint(&self.config.price_host, "/price/v2");

        self.count_request();
        let response = self
            .http()
            .get(url)
            .query(&[("ids", ids)])
            .send()
            .await
            .map_err(|e| SwapPayError::PriceFetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| SwapPayError::PriceFetchFailed(e.to_string()))?;

        response
            .json::<PricesResponse>()
            .await
            .map_err(|e| SwapPayError::PriceFetchFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SOL_MINT, USDC_MINT};
    use crate::jupiter::JupiterApiConfig;

    #[test]
    fn test_price_of_parses_decimal_strings() {
        let raw = serde_json::json!({
            "data": {
                (SOL_MINT.to_string()): {
                    "id": SOL_MINT.to_string(),
                    "type": "derivedPrice",
                    "price": "142.37",
                },
                (USDC_MINT.to_string()): {
                    "id": USDC_MINT.to_string(),
                    "type": "derivedPrice",
                    "price": "not-a-number",
                },
            },
            "timeTaken": 0.004,
        });

        let prices: PricesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(prices.price_of(&SOL_MINT), Some(142.37));
        // Non-numeric upstream values never reach the amount calculation.
        assert_eq!(prices.price_of(&USDC_MINT), None);
        assert_eq!(prices.price_of(&Pubkey::new_unique()), None);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_as_price_fetch_failed() {
        let config = JupiterApiConfig {
            // Nothing listens on the discard port.
            price_host: "http://127.0.0.1:9".to_string(),
            use_env_proxy: false,
            ..Default::default()
        };
        let client = JupiterApiClient::new(config).unwrap();

        let err = client.get_prices(&[SOL_MINT, USDC_MINT]).await.unwrap_err();
        assert!(matches!(err, SwapPayError::PriceFetchFailed(_)));
    }
}
