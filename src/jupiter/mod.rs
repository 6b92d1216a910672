//! Jupiter aggregator HTTP client (pricing, quoting, swap construction,
//! token registry). REST only; transaction submission lives in
//! [`trading`](crate::trading).

pub mod price;
pub mod quote;
pub mod swap;
pub mod tokens;

pub use price::{PriceData, PricesResponse};
pub use quote::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo, SwapMode};
pub use swap::{SwapExecutionPrefs, SwapTransactionResponse};
pub use tokens::TokenMeta;

use std::sync::atomic::{AtomicU64, Ordering};
use std::{env, time::Duration};

use anyhow::Result;
use reqwest::{Client, Proxy};

use crate::constants::endpoints::{
    JUPITER_PRICE_API_HOST, JUPITER_QUOTE_API_HOST, JUPITER_TOKEN_LIST_HOST,
};
use crate::constants::swap::DEFAULT_HTTP_TIMEOUT_MILLIS;

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterApiConfig {
    /// Quote / swap-build host, e.g. `https://quote-api.jup.ag`
    pub quote_host: String,
    /// Pricing host, e.g. `https://api.jup.ag`
    pub price_host: String,
    /// Token registry host, e.g. `https://tokens.jup.ag`
    pub token_list_host: String,
    /// Request timeout (milliseconds)
    pub timeout_millis: u64,
    /// Honor `HTTPS_PROXY`/`HTTP_PROXY` from the environment
    pub use_env_proxy: bool,
}

impl Default for JupiterApiConfig {
    fn default() -> Self {
        Self {
            quote_host: JUPITER_QUOTE_API_HOST.to_string(),
            price_host: JUPITER_PRICE_API_HOST.to_string(),
            token_list_host: JUPITER_TOKEN_LIST_HOST.to_string(),
            timeout_millis: DEFAULT_HTTP_TIMEOUT_MILLIS,
            use_env_proxy: true,
        }
    }
}

/// Jupiter HTTP API client.
///
/// Holds one pooled HTTP client; honors `HTTPS_PROXY`/`HTTP_PROXY` from the
/// environment. Outgoing requests are counted so callers (and tests) can
/// observe whether a validation failure short-circuited before any network
/// traffic.
pub struct JupiterApiClient {
    http: Client,
    pub config: JupiterApiConfig,
    requests_sent: AtomicU64,
}

impl JupiterApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: JupiterApiConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_millis);
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(64)
            .tcp_nodelay(true)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5));

        if config.use_env_proxy {
            if let Ok(https_proxy) = env::var("HTTPS_PROXY").or_else(|_| env::var("https_proxy")) {
                builder = builder.proxy(Proxy::https(&https_proxy)?);
            } else if let Ok(http_proxy) = env::var("HTTP_PROXY").or_else(|_| env::var("http_proxy"))
            {
                builder = builder.proxy(Proxy::http(&http_proxy)?);
            }
        } else {
            builder = builder.no_proxy();
        }

        let http = builder.build()?;

        Ok(Self { http, config, requests_sent: AtomicU64::new(0) })
    }

    /// Create a client with the default hosts and a 10s timeout.
    pub fn mainnet_default() -> Result<Self> {
        Self::new(JupiterApiConfig::default())
    }

    #[inline]
    pub(crate) fn endpoint(host: &str, path: &str) -> String {
        format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    #[inline]
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    #[inline]
    pub(crate) fn count_request(&self) {
        self.requests_sent.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of HTTP requests this client has sent.
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::SeqCst)
    }
}
