//! Endpoint selection with liveness probing.
//!
//! Candidates are tried strictly in list order; the first connection whose
//! slot probe answers is used and later candidates are never contacted.
//! Selection does not cache across calls; every invocation re-probes.

use std::sync::Arc;

use log::{info, warn};
use solana_commitment_config::CommitmentConfig;

use super::error::SwapPayError;
use super::rpc::LedgerRpc;
use super::types::SolanaRpcClient;

/// Creates connections from endpoint URLs.
///
/// A trait rather than a constructor so tests can hand out scripted mock
/// connections and count which endpoints were actually probed.
pub trait ConnectionFactory: Send + Sync {
    type Conn: LedgerRpc + 'static;

    fn connect(&self, url: &str) -> Arc<Self::Conn>;
}

/// Production factory building nonblocking RPC clients.
#[derive(Debug, Clone)]
pub struct RpcConnectionFactory {
    pub commitment: CommitmentConfig,
}

impl ConnectionFactory for RpcConnectionFactory {
    type Conn = SolanaRpcClient;

    fn connect(&self, url: &str) -> Arc<SolanaRpcClient> {
        Arc::new(SolanaRpcClient::new_with_commitment(url.to_string(), self.commitment))
    }
}

/// Picks the first live endpoint from a prioritized candidate list.
pub struct EndpointSelector<F: ConnectionFactory> {
    endpoints: Vec<String>,
    factory: F,
}

impl<F: ConnectionFactory> EndpointSelector<F> {
    pub fn new(endpoints: Vec<String>, factory: F) -> Self {
        Self { endpoints, factory }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Return a connection to the first candidate that answers a slot probe.
    ///
    /// Fails with [`SwapPayError::AllEndpointsUnavailable`] when every
    /// candidate fails; this is fatal for the calling operation.
    pub async fn select(&self) -> Result<Arc<F::Conn>, SwapPayError> {
        for url in &self.endpoints {
            let connection = self.factory.connect(url);
            match connection.get_slot().await {
                Ok(slot) => {
                    info!("using RPC endpoint {url} (slot {slot})");
                    return Ok(connection);
                }
                Err(err) => {
                    warn!("RPC endpoint {url} failed liveness probe: {err}");
                }
            }
        }
        Err(SwapPayError::AllEndpointsUnavailable)
    }

    /// Probe a caller-supplied connection first, falling back to selection
    /// when it is absent or no longer answering.
    pub async fn ensure(
        &self,
        existing: Option<Arc<F::Conn>>,
    ) -> Result<Arc<F::Conn>, SwapPayError> {
        if let Some(connection) = existing {
            match connection.get_slot().await {
                Ok(_) => return Ok(connection),
                Err(err) => {
                    warn!("provided connection failed, trying fallbacks: {err}");
                }
            }
        }
        self.select().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_rpc::{MockConnectionFactory, MockLedgerRpc};

    fn factory_with(health: &[(&str, bool)]) -> MockConnectionFactory {
        let mut factory = MockConnectionFactory::new();
        for (url, healthy) in health {
            let conn = if *healthy {
                MockLedgerRpc::new(url)
            } else {
                MockLedgerRpc::new(url).failing_probe()
            };
            factory.insert(url, conn);
        }
        factory
    }

    #[tokio::test]
    async fn test_select_returns_first_live_endpoint() {
        let factory = factory_with(&[("a", false), ("b", true), ("c", true)]);
        let selector = EndpointSelector::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            factory,
        );

        let connection = selector.select().await.unwrap();
        assert_eq!(connection.url(), "b");

        // The first healthy endpoint short-circuits the scan.
        assert_eq!(selector.factory().get("a").probe_calls(), 1);
        assert_eq!(selector.factory().get("b").probe_calls(), 1);
        assert_eq!(selector.factory().get("c").probe_calls(), 0);
    }

    #[tokio::test]
    async fn test_select_all_endpoints_failing() {
        let factory = factory_with(&[("a", false), ("b", false)]);
        let selector = EndpointSelector::new(vec!["a".to_string(), "b".to_string()], factory);

        let err = selector.select().await.unwrap_err();
        assert!(matches!(err, SwapPayError::AllEndpointsUnavailable));
        assert_eq!(selector.factory().get("a").probe_calls(), 1);
        assert_eq!(selector.factory().get("b").probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_keeps_live_supplied_connection() {
        let factory = factory_with(&[("a", true)]);
        let selector = EndpointSelector::new(vec!["a".to_string()], factory);

        let supplied = std::sync::Arc::new(MockLedgerRpc::new("supplied"));
        let connection = selector.ensure(Some(supplied)).await.unwrap();
        assert_eq!(connection.url(), "supplied");
        assert_eq!(selector.factory().get("a").probe_calls(), 0);
    }

    #[tokio::test]
    async fn test_ensure_falls_back_on_dead_supplied_connection() {
        let factory = factory_with(&[("a", true)]);
        let selector = EndpointSelector::new(vec!["a".to_string()], factory);

        let supplied = std::sync::Arc::new(MockLedgerRpc::new("supplied").failing_probe());
        let connection = selector.ensure(Some(supplied)).await.unwrap();
        assert_eq!(connection.url(), "a");
    }
}
