//! Transaction submission.
//!
//! Drives one aggregator payload through
//! deserialize → attach blockhash → sign → broadcast → confirm.
//! Only the blockhash fetch retries, and only once, via endpoint
//! re-selection; every other failure is terminal for the attempt. A stale
//! blockhash makes resubmission of the same signed transaction unsafe, so
//! callers retry the whole flow from a fresh quote instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use solana_sdk::{hash::Hash, signature::Signature, transaction::VersionedTransaction};

use crate::common::endpoint::{ConnectionFactory, EndpointSelector};
use crate::common::error::SwapPayError;
use crate::common::rpc::{LedgerRpc, SignatureStatus};
use crate::constants::swap::CONFIRM_POLL_INTERVAL_MS;
use crate::trading::wallet::WalletAdapter;

/// Upper bound on total confirmation polling, in case block height reports
/// stall while the signature stays pending.
const CONFIRM_DEADLINE: Duration = Duration::from_secs(120);

/// Decode an aggregator payload into a transaction.
pub fn deserialize_swap_transaction(
    payload_base64: &str,
) -> Result<VersionedTransaction, SwapPayError> {
    let bytes = STANDARD
        .decode(payload_base64)
        .map_err(|e| SwapPayError::MalformedTransaction(format!("base64 decode: {e}")))?;
    bincode::deserialize::<VersionedTransaction>(&bytes)
        .map_err(|e| SwapPayError::MalformedTransaction(format!("transaction decode: {e}")))
}

/// Submits one swap transaction over a selected connection.
///
/// Owns its connection for the duration of the attempt; a blockhash fetch
/// failure swaps it out once via the selector.
pub struct TransactionSubmitter<'a, F: ConnectionFactory> {
    selector: &'a EndpointSelector<F>,
    connection: Arc<F::Conn>,
}

impl<'a, F: ConnectionFactory> TransactionSubmitter<'a, F> {
    pub fn new(selector: &'a EndpointSelector<F>, connection: Arc<F::Conn>) -> Self {
        Self { selector, connection }
    }

    /// The connection the submitter currently holds.
    pub fn connection(&self) -> &Arc<F::Conn> {
        &self.connection
    }

    /// Run the full submission sequence for one aggregator payload.
    pub async fn submit(
        &mut self,
        payload_base64: &str,
        wallet: &dyn WalletAdapter,
    ) -> Result<Signature, SwapPayError> {
        let mut transaction = deserialize_swap_transaction(payload_base64)?;

        let (blockhash, last_valid_block_height) = self.fetch_blockhash_with_fallback().await?;
        transaction.message.set_recent_blockhash(blockhash);

        // The aggregator built the transaction for this wallet; anything else
        // cannot be signed as-is.
        let fee_payer = transaction.message.static_account_keys().first().copied();
        if fee_payer != Some(wallet.pubkey()) {
            return Err(SwapPayError::MalformedTransaction(format!(
                "fee payer {:?} does not match wallet {}",
                fee_payer,
                wallet.pubkey()
            )));
        }

        let signature = self.sign_and_broadcast(transaction, wallet).await?;
        info!("transaction sent: {signature}");

        self.confirm(&signature, last_valid_block_height).await?;
        info!("transaction confirmed: {signature}");

        Ok(signature)
    }

    /// Fetch the recency anchor, re-selecting the endpoint once on failure.
    async fn fetch_blockhash_with_fallback(&mut self) -> Result<(Hash, u64), SwapPayError> {
        match self.connection.latest_blockhash().await {
            Ok(anchor) => Ok(anchor),
            Err(first_err) => {
                warn!("failed to get blockhash from {}: {first_err}; re-selecting endpoint", self.connection.url());
                self.connection = self.selector.select().await?;
                self.connection
                    .latest_blockhash()
                    .await
                    .map_err(|e| SwapPayError::BlockhashUnavailable(e.to_string()))
            }
        }
    }

    /// Probe wallet capabilities in priority order and get the transaction
    /// onto the wire.
    async fn sign_and_broadcast(
        &self,
        transaction: VersionedTransaction,
        wallet: &dyn WalletAdapter,
    ) -> Result<Signature, SwapPayError> {
        if let Some(sender) = wallet.as_sign_and_send() {
            return sender
                .sign_and_send(transaction, self.connection.as_ref())
                .await
                .map_err(|e| SwapPayError::TransactionExecutionFailed(e.to_string()));
        }

        if let Some(signer) = wallet.as_sign_only() {
            let signed = signer
                .sign_transaction(transaction)
                .await
                .map_err(|e| SwapPayError::TransactionExecutionFailed(e.to_string()))?;
            return self
                .connection
                .send_transaction(&signed)
                .await
                .map_err(|e| SwapPayError::TransactionExecutionFailed(e.to_string()));
        }

        Err(SwapPayError::UnsupportedWallet)
    }

    /// Poll until the signature confirms, the network reports an execution
    /// error, or the recency anchor expires.
    async fn confirm(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), SwapPayError> {
        let started = Instant::now();
        loop {
            match self.connection.signature_status(signature).await {
                Ok(SignatureStatus::Confirmed) => return Ok(()),
                Ok(SignatureStatus::Failed(detail)) => {
                    return Err(SwapPayError::TransactionExecutionFailed(detail));
                }
                Ok(SignatureStatus::Pending) => {}
                Err(err) => warn!("signature status poll failed: {err}"),
            }

            match self.connection.block_height().await {
                Ok(height) if height > last_valid_block_height => {
                    return Err(SwapPayError::TransactionExpired(last_valid_block_height));
                }
                Ok(_) => {}
                Err(err) => warn!("block height poll failed: {err}"),
            }

            if started.elapsed() > CONFIRM_DEADLINE {
                return Err(SwapPayError::TransactionExpired(last_valid_block_height));
            }
            tokio::time::sleep(Duration::from_millis(CONFIRM_POLL_INTERVAL_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_rpc::{MockConnectionFactory, MockLedgerRpc};
    use crate::common::types::AnyResult;
    use crate::trading::wallet::{KeypairWallet, SignAndSendWallet};
    use async_trait::async_trait;
    use solana_sdk::message::{Message, VersionedMessage};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;
    use solana_system_interface::instruction::transfer;
    use std::sync::Arc;

    fn payload_for(payer: &Pubkey) -> String {
        let instruction = transfer(payer, &Pubkey::new_unique(), 1);
        let message = Message::new(&[instruction], Some(payer));
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(message),
        };
        STANDARD.encode(bincode::serialize(&transaction).unwrap())
    }

    fn selector_with(
        url: &str,
        connection: MockLedgerRpc,
    ) -> EndpointSelector<MockConnectionFactory> {
        let mut factory = MockConnectionFactory::new();
        factory.insert(url, connection);
        EndpointSelector::new(vec![url.to_string()], factory)
    }

    /// Wallet advertising the combined capability; never touches the
    /// connection's broadcast path.
    struct SendingWallet {
        pubkey: Pubkey,
        signature: Signature,
    }

    impl WalletAdapter for SendingWallet {
        fn pubkey(&self) -> Pubkey {
            self.pubkey
        }
        fn as_sign_and_send(&self) -> Option<&dyn SignAndSendWallet> {
            Some(self)
        }
    }

    #[async_trait]
    impl SignAndSendWallet for SendingWallet {
        async fn sign_and_send(
            &self,
            _transaction: VersionedTransaction,
            _connection: &dyn LedgerRpc,
        ) -> AnyResult<Signature> {
            Ok(self.signature)
        }
    }

    /// Wallet with no signing capability at all.
    struct CapabilityLessWallet(Pubkey);

    impl WalletAdapter for CapabilityLessWallet {
        fn pubkey(&self) -> Pubkey {
            self.0
        }
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let selector = selector_with("a", MockLedgerRpc::new("a"));
        let connection = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, connection);
        let wallet = KeypairWallet::new(Arc::new(Keypair::new()));

        let err = submitter.submit("not base64!!", &wallet).await.unwrap_err();
        assert!(matches!(err, SwapPayError::MalformedTransaction(_)));
    }

    #[tokio::test]
    async fn test_fee_payer_mismatch() {
        let connection = MockLedgerRpc::new("a").with_blockhash(Hash::new_from_array([1u8; 32]), 500);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn);
        let wallet = KeypairWallet::new(Arc::new(Keypair::new()));

        // Payload built for some other payer.
        let payload = payload_for(&Pubkey::new_unique());
        let err = submitter.submit(&payload, &wallet).await.unwrap_err();
        assert!(matches!(err, SwapPayError::MalformedTransaction(_)));
    }

    #[tokio::test]
    async fn test_sign_only_path_broadcasts_signed_transaction() {
        let expected = Signature::from([7u8; 64]);
        let blockhash = Hash::new_from_array([2u8; 32]);
        let connection = MockLedgerRpc::new("a")
            .with_blockhash(blockhash, 500)
            .with_signature(expected)
            .with_status_sequence(&[SignatureStatus::Pending, SignatureStatus::Confirmed])
            .with_block_heights(&[100]);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn.clone());

        let keypair = Arc::new(Keypair::new());
        let wallet = KeypairWallet::new(keypair.clone());
        let payload = payload_for(&keypair.pubkey());

        let signature = submitter.submit(&payload, &wallet).await.unwrap();
        assert_eq!(signature, expected);
        assert_eq!(conn.send_calls(), 1);

        // The broadcast transaction carries the wallet's signature over the
        // message with the fresh blockhash attached.
        let sent = conn.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(*sent[0].message.recent_blockhash(), blockhash);
        let message_bytes = sent[0].message.serialize();
        assert!(sent[0].signatures[0].verify(keypair.pubkey().as_ref(), &message_bytes));
    }

    #[tokio::test]
    async fn test_sign_and_send_path_preferred() {
        let expected = Signature::from([9u8; 64]);
        let connection = MockLedgerRpc::new("a")
            .with_blockhash(Hash::new_from_array([3u8; 32]), 500)
            .with_status_sequence(&[SignatureStatus::Confirmed]);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn.clone());

        let wallet = SendingWallet { pubkey: Pubkey::new_unique(), signature: expected };
        let payload = payload_for(&wallet.pubkey);

        let signature = submitter.submit(&payload, &wallet).await.unwrap();
        assert_eq!(signature, expected);
        // The wallet handled the broadcast itself.
        assert_eq!(conn.send_calls(), 0);
    }

    #[tokio::test]
    async fn test_wallet_without_capabilities() {
        let connection =
            MockLedgerRpc::new("a").with_blockhash(Hash::new_from_array([4u8; 32]), 500);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn);

        let wallet = CapabilityLessWallet(Pubkey::new_unique());
        let payload = payload_for(&wallet.0);

        let err = submitter.submit(&payload, &wallet).await.unwrap_err();
        assert!(matches!(err, SwapPayError::UnsupportedWallet));
    }

    #[tokio::test]
    async fn test_blockhash_retry_switches_endpoint() {
        let blockhash = Hash::new_from_array([5u8; 32]);
        let first = MockLedgerRpc::new("a").with_blockhash_error("rate limited");
        let fallback = MockLedgerRpc::new("b")
            .with_blockhash(blockhash, 500)
            .with_status_sequence(&[SignatureStatus::Confirmed]);

        let mut factory = MockConnectionFactory::new();
        factory.insert("a", first);
        factory.insert("b", fallback);
        // The submitter starts on "a"; only re-selection after the failed
        // blockhash fetch reaches the candidate list, which holds "b".
        let selector = EndpointSelector::new(vec!["b".to_string()], factory);

        let initial = selector.factory().get("a");
        let mut submitter = TransactionSubmitter::new(&selector, initial);

        let keypair = Arc::new(Keypair::new());
        let wallet = KeypairWallet::new(keypair.clone());
        let payload = payload_for(&keypair.pubkey());

        submitter.submit(&payload, &wallet).await.unwrap();
        assert_eq!(submitter.connection().url(), "b");
        assert_eq!(selector.factory().get("b").send_calls(), 1);
    }

    #[tokio::test]
    async fn test_blockhash_unavailable_after_retry() {
        let first = MockLedgerRpc::new("a").with_blockhash_error("down");
        let fallback = MockLedgerRpc::new("b").with_blockhash_error("also down");

        let mut factory = MockConnectionFactory::new();
        factory.insert("a", first);
        factory.insert("b", fallback);
        let selector = EndpointSelector::new(vec!["b".to_string()], factory);

        let initial = selector.factory().get("a");
        let mut submitter = TransactionSubmitter::new(&selector, initial);

        let keypair = Arc::new(Keypair::new());
        let wallet = KeypairWallet::new(keypair.clone());
        let payload = payload_for(&keypair.pubkey());

        let err = submitter.submit(&payload, &wallet).await.unwrap_err();
        assert!(matches!(err, SwapPayError::BlockhashUnavailable(_)));
    }

    #[tokio::test]
    async fn test_execution_error_reported() {
        let connection = MockLedgerRpc::new("a")
            .with_blockhash(Hash::new_from_array([6u8; 32]), 500)
            .with_status_sequence(&[SignatureStatus::Failed(
                "custom program error: 0x1771".to_string(),
            )]);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn);

        let keypair = Arc::new(Keypair::new());
        let wallet = KeypairWallet::new(keypair.clone());
        let payload = payload_for(&keypair.pubkey());

        let err = submitter.submit(&payload, &wallet).await.unwrap_err();
        match err {
            SwapPayError::TransactionExecutionFailed(detail) => {
                assert!(detail.contains("0x1771"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_expiry_height_passes_before_confirmation() {
        // Stays pending while reported block heights march past the anchor's
        // last valid height.
        let connection = MockLedgerRpc::new("a")
            .with_blockhash(Hash::new_from_array([7u8; 32]), 250)
            .with_status_sequence(&[SignatureStatus::Pending])
            .with_block_heights(&[100, 200, 300]);
        let selector = selector_with("a", connection);
        let conn = selector.select().await.unwrap();
        let mut submitter = TransactionSubmitter::new(&selector, conn);

        let keypair = Arc::new(Keypair::new());
        let wallet = KeypairWallet::new(keypair.clone());
        let payload = payload_for(&keypair.pubkey());

        let err = submitter.submit(&payload, &wallet).await.unwrap_err();
        assert!(matches!(err, SwapPayError::TransactionExpired(250)));
    }
}
