//! Verified token registry.
//!
//! Checkout surfaces use this to present token choices and resolve display
//! metadata (symbol, decimals) without touching the chain.

use serde::Deserialize;

use super::JupiterApiClient;
use crate::common::types::AnyResult;

/// One entry of the verified token registry.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenMeta {
    /// Mint address
    pub address: String,
    #[serde(rename = "chainId", default)]
    pub chain_id: i64,
    pub decimals: u8,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JupiterApiClient {
    /// Fetch the aggregator's verified token list.
    pub async fn get_verified_tokens(&self) -> AnyResult<Vec<TokenMeta>> {
        let url = Self::endpoint(&self.config.token_list_host, "/tokens");

        self.count_request();
        let response = self
            .http()
            .get(url)
            .query(&[("tags", "verified")])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Vec<TokenMeta>>().await?)
    }
}
