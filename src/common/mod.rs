pub mod endpoint;
pub mod error;
pub mod mock_rpc;
pub mod rpc;
pub mod types;

pub use endpoint::{ConnectionFactory, EndpointSelector, RpcConnectionFactory};
pub use error::SwapPayError;
pub use rpc::{LedgerRpc, SignatureStatus};
pub use types::{AnyResult, SolanaRpcClient, SwapPayConfig};
