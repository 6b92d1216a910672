pub mod submitter;
pub mod wallet;

pub use submitter::{TransactionSubmitter, deserialize_swap_transaction};
pub use wallet::{KeypairWallet, SignAndSendWallet, SignOnlyWallet, WalletAdapter};
