//! Default network endpoints.
//!
//! The RPC list is ordered by priority; the endpoint selector probes each in
//! turn and uses the first one that answers.

/// Default prioritized RPC endpoint candidates
pub const DEFAULT_RPC_ENDPOINTS: &[&str] = &[
    "https://api.devnet.solana.com",
    "https://solana-devnet.rpc.extrnode.com",
    "https://rpc.ankr.com/solana",
    "https://solana-api.projectserum.com",
];

/// Jupiter quote / swap-build API host
pub const JUPITER_QUOTE_API_HOST: &str = "https://quote-api.jup.ag";

/// Jupiter pricing API host
pub const JUPITER_PRICE_API_HOST: &str = "https://api.jup.ag";

/// Jupiter token registry host
pub const JUPITER_TOKEN_LIST_HOST: &str = "https://tokens.jup.ag";
