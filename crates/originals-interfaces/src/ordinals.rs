//! Ordinals provider contract (§4.8, §6): commit-reveal inscription,
//! transfer, and lookup, implemented against a real Bitcoin node/indexer by
//! the caller. `SimulatedOrdinalsProvider` is an in-memory double sufficient
//! to drive the bitcoin manager's tests without a real chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use originals_core::OriginalsError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionRequest {
    pub content_bytes: Vec<u8>,
    pub content_type: String,
    pub fee_rate: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionResult {
    pub commit_tx_id: String,
    pub reveal_tx_id: String,
    pub inscription_id: String,
    pub satoshi: u64,
    pub fee_paid: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub inscription_id: String,
    pub recipient_address: String,
    pub fee_rate: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub txid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inscription {
    pub inscription_id: String,
    pub satoshi: u64,
    pub content_bytes: Vec<u8>,
    pub content_type: String,
    pub txid: String,
    pub block_height: Option<u64>,
}

#[async_trait]
pub trait OrdinalsProvider: Send + Sync {
    async fn create_inscription(&self, request: InscriptionRequest) -> Result<InscriptionResult, OriginalsError>;
    async fn transfer_inscription(&self, request: TransferRequest) -> Result<TransferResult, OriginalsError>;
    async fn get_inscription_by_id(&self, id: &str) -> Result<Option<Inscription>, OriginalsError>;
    async fn get_inscriptions_by_satoshi(&self, satoshi: u64) -> Result<Vec<Inscription>, OriginalsError>;
    async fn estimate_fee(&self, target_blocks: u32) -> Result<u64, OriginalsError>;
}

/// Dust limit in sats for a Taproot output (§4.13).
pub const DUST_LIMIT_SATS: u64 = 330;

/// An in-memory ordinals indexer/broadcaster double. Each call to
/// `create_inscription` claims the next satoshi in an increasing sequence —
/// a stand-in for real ordinal-aware UTXO selection — so the front-running
/// guard always finds a fresh satoshi.
pub struct SimulatedOrdinalsProvider {
    next_satoshi: AtomicU64,
    inscriptions: Mutex<HashMap<String, Inscription>>,
    by_satoshi: Mutex<HashMap<u64, Vec<String>>>,
    tx_counter: AtomicU64,
}

impl Default for SimulatedOrdinalsProvider {
    fn default() -> Self {
        Self {
            next_satoshi: AtomicU64::new(1_000_000_000),
            inscriptions: Mutex::new(HashMap::new()),
            by_satoshi: Mutex::new(HashMap::new()),
            tx_counter: AtomicU64::new(0),
        }
    }
}

impl SimulatedOrdinalsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_txid(&self, prefix: &str) -> String {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}{n:064x}")
    }
}

#[async_trait]
impl OrdinalsProvider for SimulatedOrdinalsProvider {
    async fn create_inscription(&self, request: InscriptionRequest) -> Result<InscriptionResult, OriginalsError> {
        if request.content_bytes.len() > 4 * 1024 * 1024 {
            return Err(OriginalsError::RevealPayloadTooLarge { size: request.content_bytes.len() });
        }
        let satoshi = self.next_satoshi.fetch_add(1, Ordering::SeqCst);
        let commit_tx_id = self.next_txid("c");
        let reveal_tx_id = self.next_txid("r");
        let inscription_id = format!("{reveal_tx_id}i0");
        let fee_paid = request.fee_rate.saturating_mul((request.content_bytes.len() as u64 / 4).max(1));

        let inscription = Inscription {
            inscription_id: inscription_id.clone(),
            satoshi,
            content_bytes: request.content_bytes,
            content_type: request.content_type,
            txid: reveal_tx_id.clone(),
            block_height: None,
        };
        self.inscriptions.lock().await.insert(inscription_id.clone(), inscription);
        self.by_satoshi.lock().await.entry(satoshi).or_default().push(inscription_id.clone());

        Ok(InscriptionResult { commit_tx_id, reveal_tx_id, inscription_id, satoshi, fee_paid })
    }

    async fn transfer_inscription(&self, request: TransferRequest) -> Result<TransferResult, OriginalsError> {
        if !self.inscriptions.lock().await.contains_key(&request.inscription_id) {
            return Err(OriginalsError::NotFound(format!("inscription {} not found", request.inscription_id)));
        }
        Ok(TransferResult { txid: self.next_txid("t") })
    }

    async fn get_inscription_by_id(&self, id: &str) -> Result<Option<Inscription>, OriginalsError> {
        Ok(self.inscriptions.lock().await.get(id).cloned())
    }

    async fn get_inscriptions_by_satoshi(&self, satoshi: u64) -> Result<Vec<Inscription>, OriginalsError> {
        let by_sat = self.by_satoshi.lock().await;
        let ids = by_sat.get(&satoshi).cloned().unwrap_or_default();
        let inscriptions = self.inscriptions.lock().await;
        Ok(ids.iter().filter_map(|id| inscriptions.get(id).cloned()).collect())
    }

    async fn estimate_fee(&self, target_blocks: u32) -> Result<u64, OriginalsError> {
        Ok(if target_blocks <= 1 { 20 } else if target_blocks <= 6 { 10 } else { 3 })
    }
}
