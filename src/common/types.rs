use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::constants;
use crate::jupiter::JupiterApiConfig;

/// Nonblocking Solana RPC client used throughout the crate
pub type SolanaRpcClient = solana_client::nonblocking::rpc_client::RpcClient;
pub type AnyResult<T> = anyhow::Result<T>;

/// Immutable configuration for a [`SwapPayClient`](crate::SwapPayClient).
///
/// The endpoint list is read-only; each swap-and-pay invocation re-probes it
/// in order rather than caching a selection.
#[derive(Debug, Clone)]
pub struct SwapPayConfig {
    /// Prioritized RPC endpoint candidates
    pub rpc_endpoints: Vec<String>,
    /// Commitment level used for probes, broadcast preflight and confirmation
    pub commitment: CommitmentConfig,
    /// Settlement currency mint (defaults to USDC)
    pub settlement_mint: Pubkey,
    /// Decimals of the settlement currency
    pub settlement_decimals: u8,
    /// Default slippage tolerance in basis points
    pub slippage_bps: u16,
    /// Aggregator API configuration
    pub jupiter: JupiterApiConfig,
}

impl Default for SwapPayConfig {
    fn default() -> Self {
        Self {
            rpc_endpoints: constants::endpoints::DEFAULT_RPC_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            commitment: CommitmentConfig::confirmed(),
            settlement_mint: constants::USDC_MINT,
            settlement_decimals: constants::USDC_DECIMALS,
            slippage_bps: constants::swap::DEFAULT_SLIPPAGE_BPS,
            jupiter: JupiterApiConfig::default(),
        }
    }
}

impl SwapPayConfig {
    pub fn new(rpc_endpoints: Vec<String>, commitment: CommitmentConfig) -> Self {
        Self { rpc_endpoints, commitment, ..Self::default() }
    }

    /// Override the settlement currency.
    pub fn with_settlement_mint(mut self, mint: Pubkey, decimals: u8) -> Self {
        self.settlement_mint = mint;
        self.settlement_decimals = decimals;
        self
    }

    /// Override the default slippage tolerance.
    pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }
}
