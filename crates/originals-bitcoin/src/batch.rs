//! Batch inscription (§4.13, §4.15): inscribe several items in one fee
//! budget, splitting it proportionally to each item's byte size. Rounding
//! remainders accrue to the first item rather than being lost or double
//! counted.
//!
//! Two distinct modes live here, matching the two batch postures §4.13
//! describes: `inscribe_batch` makes one `create_inscription` call per item
//! and keeps going past individual failures (N separate inscriptions, no
//! shared fate); `inscribe_batch_atomic` folds every item into a single
//! combined manifest and makes exactly one `create_inscription` call, so
//! the items share one commit-reveal pair and either all land or none do.

use originals_core::OriginalsError;
use originals_crypto::{cbor, hash};
use originals_interfaces::ordinals::{InscriptionRequest, InscriptionResult, OrdinalsProvider};
use serde::{Deserialize, Serialize};

pub struct BatchItem {
    pub content_bytes: Vec<u8>,
    pub content_type: String,
}

/// One asset's entry within a combined batch manifest (§4.13).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifestEntry {
    pub hash: String,
    pub content_type: String,
    pub size: usize,
}

/// The deterministic materialization of a whole batch, CBOR-encoded as the
/// single inscription's reveal payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    pub entries: Vec<BatchManifestEntry>,
}

/// The outcome of an atomic batch inscription: the one inscription produced
/// plus each item's proportional share of the fee actually paid, aligned by
/// index with the input `items`.
pub struct AtomicBatchResult {
    pub inscription: InscriptionResult,
    pub fee_shares: Vec<u64>,
}

/// Split `total_fee_sats` across `items` in proportion to each item's byte
/// size. Any remainder left by integer division goes to the first item.
pub fn split_fee_proportionally(total_fee_sats: u64, items: &[BatchItem]) -> Vec<u64> {
    if items.is_empty() {
        return Vec::new();
    }
    let total_bytes: u64 = items.iter().map(|i| i.content_bytes.len() as u64).sum();
    if total_bytes == 0 {
        let share = total_fee_sats / items.len() as u64;
        let remainder = total_fee_sats - share * items.len() as u64;
        return items
            .iter()
            .enumerate()
            .map(|(i, _)| if i == 0 { share + remainder } else { share })
            .collect();
    }

    let mut shares: Vec<u64> = items.iter().map(|i| total_fee_sats * i.content_bytes.len() as u64 / total_bytes).collect();
    let distributed: u64 = shares.iter().sum();
    let remainder = total_fee_sats - distributed;
    shares[0] += remainder;
    shares
}

/// Inscribe each item at its proportional share of `total_fee_sats` /
/// `fee_rate`-equivalent budget, continuing past a single item's failure so
/// one bad item doesn't block the rest (§4.13, §4.15).
pub async fn inscribe_batch<P: OrdinalsProvider>(provider: &P, items: Vec<BatchItem>, fee_rate: u64) -> Vec<Result<InscriptionResult, OriginalsError>> {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = provider.create_inscription(InscriptionRequest { content_bytes: item.content_bytes, content_type: item.content_type, fee_rate }).await;
        results.push(result);
    }
    results
}

/// Build the combined manifest for an atomic batch: one entry per item,
/// each with its own content hash, so a verifier can check any single
/// asset's inclusion without re-hashing the whole payload.
pub fn build_batch_manifest(items: &[BatchItem]) -> BatchManifest {
    let entries = items
        .iter()
        .map(|item| BatchManifestEntry {
            hash: hash::sha256_hex(&item.content_bytes),
            content_type: item.content_type.clone(),
            size: item.content_bytes.len(),
        })
        .collect();
    BatchManifest { entries }
}

/// Inscribe `items` as a single combined manifest in one commit-reveal pair
/// (§4.13's "single-transaction mode"). Either the one `create_inscription`
/// call succeeds and every item is covered by the resulting inscription, or
/// it fails and none are — there is no partial outcome to account for, since
/// only one provider call is made. `fee_rate` is the rate the provider is
/// asked to inscribe at; the returned `fee_shares` apportion whatever it
/// reports paying back across the items, proportional to manifest bytes.
pub async fn inscribe_batch_atomic<P: OrdinalsProvider>(provider: &P, items: Vec<BatchItem>, fee_rate: u64) -> Result<AtomicBatchResult, OriginalsError> {
    if items.is_empty() {
        return Err(OriginalsError::ValidationFailed("batch inscription requires at least one item".into()));
    }
    let manifest = build_batch_manifest(&items);
    let manifest_bytes = cbor::to_vec(&manifest)?;

    let inscription = provider
        .create_inscription(InscriptionRequest { content_bytes: manifest_bytes, content_type: "application/cbor".to_string(), fee_rate })
        .await?;

    let fee_shares = split_fee_proportionally(inscription.fee_paid, &items);
    Ok(AtomicBatchResult { inscription, fee_shares })
}
