//! Commit-reveal inscription and transfer orchestration (§4.13).
//!
//! The heavy lifting (UTXO selection, PSBT construction, broadcast) belongs
//! to whatever `OrdinalsProvider` the deployment wires in; this manager's
//! job is the protocol-level guardrails around it: validating inputs before
//! a provider call is ever made, and refusing to inscribe onto a satoshi
//! that may already carry content (front-running).

use chrono::Utc;
use originals_core::{BtcoNetwork, OriginalsError};
use originals_interfaces::ordinals::{InscriptionRequest, InscriptionResult, OrdinalsProvider, TransferRequest, TransferResult};
use originals_recovery::{bump_fee_rate, retry_with_backoff, RetryPolicy};

use crate::validation::{validate_address, validate_fee_rate, validate_payload_size};

pub struct BitcoinManager<'a, P: OrdinalsProvider> {
    provider: &'a P,
    network: BtcoNetwork,
}

impl<'a, P: OrdinalsProvider> BitcoinManager<'a, P> {
    pub fn new(provider: &'a P, network: BtcoNetwork) -> Self {
        Self { provider, network }
    }

    /// Validate the request, then commit-reveal inscribe `content_bytes`
    /// (§4.13). On `FeeTooLow` the fee rate is bumped once (x1.5, capped at
    /// `max_fee_rate`) and retried; a second `FeeTooLow` propagates.
    pub async fn inscribe(&self, content_bytes: Vec<u8>, content_type: &str, fee_rate: u64, max_fee_rate: u64) -> Result<InscriptionResult, OriginalsError> {
        validate_payload_size(&content_bytes)?;
        validate_fee_rate(fee_rate)?;
        validate_fee_rate(max_fee_rate)?;

        let retry_policy = RetryPolicy::default();
        let first_attempt = retry_with_backoff(&retry_policy, || {
            self.provider.create_inscription(InscriptionRequest {
                content_bytes: content_bytes.clone(),
                content_type: content_type.to_string(),
                fee_rate,
            })
        })
        .await;

        match first_attempt {
            Err(OriginalsError::FeeTooLow) => {
                let bumped_rate = bump_fee_rate(fee_rate, max_fee_rate)?;
                tracing::warn!(fee_rate, bumped_rate, "fee too low, retrying at bumped rate");
                self.provider
                    .create_inscription(InscriptionRequest { content_bytes, content_type: content_type.to_string(), fee_rate: bumped_rate })
                    .await
            }
            other => other,
        }
    }

    /// Transfer an existing inscription to `recipient_address`, guarding
    /// against front-running by confirming the source satoshi still carries
    /// only the expected inscription immediately before broadcast (§4.13).
    pub async fn transfer(&self, inscription_id: &str, recipient_address: &str, fee_rate: u64) -> Result<TransferResult, OriginalsError> {
        validate_fee_rate(fee_rate)?;
        validate_address(recipient_address, self.network)?;

        let inscription = self
            .provider
            .get_inscription_by_id(inscription_id)
            .await?
            .ok_or_else(|| OriginalsError::NotFound(format!("inscription {inscription_id} not found")))?;

        self.guard_against_front_running(inscription.satoshi, inscription_id).await?;

        self.provider
            .transfer_inscription(TransferRequest { inscription_id: inscription_id.to_string(), recipient_address: recipient_address.to_string(), fee_rate })
            .await
    }

    /// Verify that `satoshi` carries no inscription other than `expected_id`
    /// (§4.13's front-running prevention). Called immediately before a
    /// transfer or reveal broadcast, never earlier, since the window between
    /// the check and the broadcast is where a race could land.
    async fn guard_against_front_running(&self, satoshi: u64, expected_id: &str) -> Result<(), OriginalsError> {
        let existing = self.provider.get_inscriptions_by_satoshi(satoshi).await?;
        if existing.iter().any(|i| i.inscription_id != expected_id) {
            return Err(OriginalsError::FrontRunningDetected(satoshi));
        }
        Ok(())
    }

    pub async fn estimate_fee_rate(&self, target_blocks: u32) -> Result<u64, OriginalsError> {
        let rate = self.provider.estimate_fee(target_blocks).await?;
        validate_fee_rate(rate)?;
        Ok(rate)
    }
}

pub fn now() -> chrono::DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_interfaces::ordinals::SimulatedOrdinalsProvider;

    #[tokio::test]
    async fn inscribe_validates_then_delegates_to_provider() {
        let provider = SimulatedOrdinalsProvider::new();
        let manager = BitcoinManager::new(&provider, BtcoNetwork::Mainnet);
        let result = manager.inscribe(b"hello".to_vec(), "text/plain", 10, 100).await.unwrap();
        assert!(!result.inscription_id.is_empty());
    }

    #[tokio::test]
    async fn inscribe_rejects_oversized_payload_before_calling_provider() {
        let provider = SimulatedOrdinalsProvider::new();
        let manager = BitcoinManager::new(&provider, BtcoNetwork::Mainnet);
        let huge = vec![0u8; 5 * 1024 * 1024];
        let err = manager.inscribe(huge, "application/octet-stream", 10, 100).await.unwrap_err();
        assert!(matches!(err, OriginalsError::RevealPayloadTooLarge { .. }));
    }

    #[tokio::test]
    async fn transfer_unknown_inscription_errors() {
        let provider = SimulatedOrdinalsProvider::new();
        let manager = BitcoinManager::new(&provider, BtcoNetwork::Mainnet);
        let err = manager.transfer("nonexistent", "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", 10).await.unwrap_err();
        assert!(matches!(err, OriginalsError::NotFound(_)));
    }

    #[tokio::test]
    async fn transfer_round_trips_through_simulated_provider() {
        let provider = SimulatedOrdinalsProvider::new();
        let manager = BitcoinManager::new(&provider, BtcoNetwork::Mainnet);
        let inscribed = manager.inscribe(b"hello".to_vec(), "text/plain", 10, 100).await.unwrap();
        let transferred = manager.transfer(&inscribed.inscription_id, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", 10).await.unwrap();
        assert!(!transferred.txid.is_empty());
    }
}
