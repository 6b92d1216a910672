//! Failure taxonomy for the swap-and-pay flow.
//!
//! Every component surfaces a typed failure with the upstream detail
//! preserved; the orchestrator forwards the first failure verbatim.

use solana_sdk::pubkey::Pubkey;

/// Errors produced by the swap-and-pay flow.
#[derive(Debug, thiserror::Error)]
pub enum SwapPayError {
    /// Every candidate RPC endpoint failed its liveness probe.
    #[error("all RPC endpoints failed their liveness probe")]
    AllEndpointsUnavailable,

    /// The pricing service call failed.
    #[error("price fetch failed: {0}")]
    PriceFetchFailed(String),

    /// Input and output mints of a quote request are identical.
    #[error("invalid token pair: input and output mint are both {0}")]
    InvalidTokenPair(Pubkey),

    /// The swap amount is zero or could not be derived.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The quoting service call failed.
    #[error("quote fetch failed: {0}")]
    QuoteFetchFailed(String),

    /// The swap-build service call failed or returned no payload.
    #[error("swap transaction build failed: {0}")]
    SwapBuildFailed(String),

    /// The aggregator payload could not be decoded into a transaction.
    #[error("malformed swap transaction payload: {0}")]
    MalformedTransaction(String),

    /// The latest blockhash could not be obtained, even after re-selecting
    /// an endpoint.
    #[error("failed to fetch a recent blockhash: {0}")]
    BlockhashUnavailable(String),

    /// The wallet exposes neither a sign-and-send nor a sign-only capability.
    #[error("wallet supports neither sign-and-send nor sign-only")]
    UnsupportedWallet,

    /// The network reported an execution error for the submitted signature.
    #[error("transaction failed on-chain: {0}")]
    TransactionExecutionFailed(String),

    /// The blockhash expired before a confirmation was observed.
    #[error("transaction expired before confirmation (last valid block height {0})")]
    TransactionExpired(u64),
}
