//! Delegated wallet signing.
//!
//! Wallets come in two shapes: some expose a combined sign-and-send
//! operation (browser wallet adapters), others only sign and leave the
//! broadcast to the caller. The submitter probes the capabilities at runtime,
//! in that priority order.

use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::VersionedTransaction,
};

use crate::common::rpc::LedgerRpc;
use crate::common::types::AnyResult;

/// Combined sign-and-submit contract.
#[async_trait]
pub trait SignAndSendWallet: Send + Sync {
    /// Sign the transaction and broadcast it over `connection`, returning
    /// the network signature.
    async fn sign_and_send(
        &self,
        transaction: VersionedTransaction,
        connection: &dyn LedgerRpc,
    ) -> AnyResult<Signature>;
}

/// Sign-only contract; the caller broadcasts.
#[async_trait]
pub trait SignOnlyWallet: Send + Sync {
    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> AnyResult<VersionedTransaction>;
}

/// A wallet as seen by the flow: a public key plus whichever signing
/// capabilities it actually has.
pub trait WalletAdapter: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    fn as_sign_and_send(&self) -> Option<&dyn SignAndSendWallet> {
        None
    }

    fn as_sign_only(&self) -> Option<&dyn SignOnlyWallet> {
        None
    }
}

/// Local keypair wallet (sign-only), for server-side flows and tests.
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
}

impl KeypairWallet {
    pub fn new(keypair: Arc<Keypair>) -> Self {
        Self { keypair }
    }
}

impl WalletAdapter for KeypairWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn as_sign_only(&self) -> Option<&dyn SignOnlyWallet> {
        Some(self)
    }
}

#[async_trait]
impl SignOnlyWallet for KeypairWallet {
    async fn sign_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> AnyResult<VersionedTransaction> {
        let message_bytes = transaction.message.serialize();
        let signature = self.keypair.try_sign_message(&message_bytes)?;
        // The fee payer occupies the first signature slot.
        if transaction.signatures.is_empty() {
            transaction.signatures.push(signature);
        } else {
            transaction.signatures[0] = signature;
        }
        Ok(transaction)
    }
}
