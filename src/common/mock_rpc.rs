//! Scripted mock ledger connections.
//!
//! Unit and integration tests drive the endpoint selector and the submitter
//! against these instead of a live cluster. Scripts are consumed in order;
//! the last entry of a script repeats once drained.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use solana_sdk::{hash::Hash, signature::Signature, transaction::VersionedTransaction};

use super::endpoint::ConnectionFactory;
use super::rpc::{LedgerRpc, SignatureStatus};
use super::types::AnyResult;

/// A [`LedgerRpc`] whose responses are scripted up front.
#[derive(Debug)]
pub struct MockLedgerRpc {
    label: String,
    probe_ok: bool,
    slot: u64,
    blockhash_script: Mutex<VecDeque<Result<(Hash, u64), String>>>,
    status_script: Mutex<VecDeque<SignatureStatus>>,
    block_height_script: Mutex<VecDeque<u64>>,
    signature: Signature,
    probe_calls: AtomicUsize,
    send_calls: AtomicUsize,
    sent: Mutex<Vec<VersionedTransaction>>,
}

impl MockLedgerRpc {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            probe_ok: true,
            slot: 1_000,
            blockhash_script: Mutex::new(VecDeque::new()),
            status_script: Mutex::new(VecDeque::new()),
            block_height_script: Mutex::new(VecDeque::new()),
            signature: Signature::default(),
            probe_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make every slot probe fail.
    pub fn failing_probe(mut self) -> Self {
        self.probe_ok = false;
        self
    }

    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = slot;
        self
    }

    /// Append a successful blockhash response to the script.
    pub fn with_blockhash(self, blockhash: Hash, last_valid_block_height: u64) -> Self {
        self.blockhash_script
            .lock()
            .unwrap()
            .push_back(Ok((blockhash, last_valid_block_height)));
        self
    }

    /// Append a failing blockhash response to the script.
    pub fn with_blockhash_error(self, detail: &str) -> Self {
        self.blockhash_script.lock().unwrap().push_back(Err(detail.to_string()));
        self
    }

    /// Script the signature status sequence observed by confirmation polls.
    pub fn with_status_sequence(self, statuses: &[SignatureStatus]) -> Self {
        self.status_script.lock().unwrap().extend(statuses.iter().cloned());
        self
    }

    /// Script the block heights reported while polling.
    pub fn with_block_heights(self, heights: &[u64]) -> Self {
        self.block_height_script.lock().unwrap().extend(heights.iter().copied());
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Transactions handed to `send_transaction`, in order.
    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    fn pop_or_repeat<T: Clone>(script: &Mutex<VecDeque<T>>, fallback: T) -> T {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(fallback)
        }
    }
}

#[async_trait]
impl LedgerRpc for MockLedgerRpc {
    fn url(&self) -> String {
        self.label.clone()
    }

    async fn get_slot(&self) -> AnyResult<u64> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_ok {
            Ok(self.slot)
        } else {
            Err(anyhow!("connection refused ({})", self.label))
        }
    }

    async fn latest_blockhash(&self) -> AnyResult<(Hash, u64)> {
        let fallback: Result<(Hash, u64), String> = Ok((Hash::default(), self.slot + 150));
        Self::pop_or_repeat(&self.blockhash_script, fallback).map_err(|detail| anyhow!("{detail}"))
    }

    async fn block_height(&self) -> AnyResult<u64> {
        Ok(Self::pop_or_repeat(&self.block_height_script, 0))
    }

    async fn send_transaction(&self, transaction: &VersionedTransaction) -> AnyResult<Signature> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(self.signature)
    }

    async fn signature_status(&self, _signature: &Signature) -> AnyResult<SignatureStatus> {
        Ok(Self::pop_or_repeat(&self.status_script, SignatureStatus::Pending))
    }
}

/// Factory handing out pre-registered mock connections by URL.
#[derive(Default)]
pub struct MockConnectionFactory {
    connections: Vec<(String, Arc<MockLedgerRpc>)>,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, connection: MockLedgerRpc) {
        self.connections.push((url.to_string(), Arc::new(connection)));
    }

    pub fn get(&self, url: &str) -> Arc<MockLedgerRpc> {
        self.connections
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, c)| c.clone())
            .unwrap_or_else(|| panic!("no mock connection registered for {url}"))
    }
}

impl ConnectionFactory for MockConnectionFactory {
    type Conn = MockLedgerRpc;

    fn connect(&self, url: &str) -> Arc<MockLedgerRpc> {
        self.get(url)
    }
}
