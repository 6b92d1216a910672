//! Swap execution defaults.

/// Default slippage tolerance in basis points (50 = 0.5%)
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Default cap on the prioritization fee attached by the swap builder
pub const DEFAULT_MAX_PRIORITY_FEE_LAMPORTS: u64 = 1_000_000;

/// Interval between signature status polls during confirmation
pub const CONFIRM_POLL_INTERVAL_MS: u64 = 400;

/// Default timeout applied to aggregator HTTP calls (milliseconds)
pub const DEFAULT_HTTP_TIMEOUT_MILLIS: u64 = 10_000;
