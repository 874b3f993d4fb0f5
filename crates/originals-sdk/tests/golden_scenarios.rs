//! End-to-end lifecycle scenarios for the `Originals` facade: create a
//! `did:peer` asset, version it, publish it to `did:webvh`, inscribe it on
//! `did:btco`, and transfer ownership — each checked against the state the
//! cryptographic event log replays back out.

use originals_core::{CredentialKind, FinalityStatus, Layer};
use originals_sdk::Originals;

const ALICE_RECIPIENT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

// ── Scenario 1: create a peer asset ───────────────────────────────────────────

#[tokio::test]
async fn create_peer_asset_records_one_resource_and_a_credential() {
    let mut originals = Originals::new("https://example.com");

    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();

    assert!(created.did.starts_with("did:peer:4"));
    assert_eq!(created.credential.kind(), Some(CredentialKind::ResourceCreated));

    let asset = originals.replay(&created.asset_id).await.unwrap();
    assert_eq!(asset.current_layer, Layer::Peer);
    assert_eq!(asset.resources.len(), 1);
    assert_eq!(
        asset.resources[0].hash.to_hex(),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

// ── Scenario 2: add a new resource version ───────────────────────────────────

#[tokio::test]
async fn adding_a_version_preserves_history_and_links_hashes() {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();

    originals
        .add_resource_version(&created.asset_id, &created.did, &created.verification_method, "r1", b"hello v2".to_vec())
        .await
        .unwrap();

    let asset = originals.replay(&created.asset_id).await.unwrap();
    let versions = asset.get_all_versions("r1");
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, 1);
    assert_eq!(versions[1].version, 2);
    assert_eq!(versions[1].previous_version_hash, Some(versions[0].hash.clone()));

    // The original version is still retrievable by version number.
    let v1 = asset.get_resource_version("r1", 1).unwrap();
    assert_eq!(v1.content.as_deref(), Some(&b"hello"[..]));
}

// ── Scenario 3: publish to did:webvh ──────────────────────────────────────────

#[tokio::test]
async fn migrating_to_webvh_hosts_resources_and_issues_a_provisional_attestation() {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();

    let webvh = originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, "example.com", "alice")
        .await
        .unwrap();

    assert_eq!(webvh.target_did, "did:webvh:example.com:alice");
    assert_eq!(webvh.resource_urls.len(), 1);

    match &webvh.attestation {
        originals_core::Attestation::Preliminary { .. } => {}
        originals_core::Attestation::Final { .. } => panic!("expected a preliminary attestation"),
    }

    let asset = originals.replay(&created.asset_id).await.unwrap();
    assert_eq!(asset.current_layer, Layer::Webvh);
    assert_eq!(asset.migrations.len(), 1);
    assert_eq!(asset.migrations[0].from, Layer::Peer);
    assert_eq!(asset.migrations[0].to, Layer::Webvh);
}

// ── Scenario 4: inscribe on did:btco ───────────────────────────────────────────

#[tokio::test]
async fn migrating_to_btco_inscribes_and_issues_a_final_attestation() {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();
    let webvh = originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, "example.com", "alice")
        .await
        .unwrap();

    let btco = originals
        .migrate_to_btco(&created.asset_id, &webvh.target_did, &created.verification_method, 10, 40)
        .await
        .unwrap();

    assert!(btco.target_did.starts_with("did:btco:"));
    assert!(!btco.inscription_id.is_empty());
    assert!(!btco.commit_tx_id.is_empty());
    assert!(!btco.reveal_tx_id.is_empty());

    match &btco.attestation {
        originals_core::Attestation::Final { inscription_id, txid, .. } => {
            assert_eq!(inscription_id, &btco.inscription_id);
            assert_eq!(txid, &btco.reveal_tx_id);
        }
        originals_core::Attestation::Preliminary { .. } => panic!("expected a final attestation"),
    }

    let asset = originals.replay(&created.asset_id).await.unwrap();
    assert_eq!(asset.current_layer, Layer::Btco);
    assert_eq!(asset.finality, FinalityStatus::Final);
    assert_eq!(asset.migrations.len(), 2);
}

// ── Scenario 5: reverse migrations are rejected ───────────────────────────────

#[tokio::test]
async fn webvh_to_peer_is_not_an_allowed_transition() {
    use originals_core::did::is_allowed_transition;

    assert!(!is_allowed_transition(Layer::Webvh, Layer::Peer));

    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();
    originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, "example.com", "alice")
        .await
        .unwrap();

    let asset_before = originals.replay(&created.asset_id).await.unwrap();
    let report = originals_lifecycle::validate_migration(&asset_before, Layer::Webvh, Layer::Peer);
    assert!(!report.passed());

    let asset_after = originals.replay(&created.asset_id).await.unwrap();
    assert_eq!(asset_after.migrations.len(), asset_before.migrations.len());
}

// ── Scenario 6: transfer ownership on a btco asset ────────────────────────────

#[tokio::test]
async fn transfer_moves_custody_without_changing_identity_or_satoshi() {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();
    let webvh = originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, "example.com", "alice")
        .await
        .unwrap();
    let btco = originals
        .migrate_to_btco(&created.asset_id, &webvh.target_did, &created.verification_method, 10, 40)
        .await
        .unwrap();

    let transfer = originals
        .transfer(&created.asset_id, &btco.target_did, &btco.inscription_id, ALICE_RECIPIENT, 10, &created.verification_method)
        .await
        .unwrap();

    assert_eq!(transfer.to, ALICE_RECIPIENT);
    assert!(!transfer.transaction_id.is_empty());

    let asset = originals.replay(&created.asset_id).await.unwrap();
    assert_eq!(asset.current_layer, Layer::Btco, "a transfer moves custody, not layer");
    assert_eq!(asset.transfers.len(), 1);

    let satoshi: u64 = btco.target_did.trim_start_matches("did:btco:").parse().unwrap();
    let inscriptions = originals.ordinals.get_inscriptions_by_satoshi(satoshi).await.unwrap();
    assert!(inscriptions.iter().any(|i| i.inscription_id == btco.inscription_id));
}

// ── Scenario 7: re-verify a migrated asset's event log ────────────────────────

#[tokio::test]
async fn verify_asset_accepts_a_multi_layer_history_with_warnings() {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset("r1", "text", "text/plain", b"hello".to_vec())
        .await
        .unwrap();
    originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, "example.com", "alice")
        .await
        .unwrap();

    let report = originals.verify_asset(&created.asset_id).await.unwrap();
    assert_eq!(report.events_checked, 2);
    // Every signed event was checked against a *current* resolution, not a
    // historical one, and no issuance credential is stored on the asset
    // itself — both are non-fatal, surfaced as warnings rather than errors.
    assert!(report.warnings.contains(&originals_credentials::VerificationWarning::HistoricalKeyAssumed));
    assert!(report.warnings.contains(&originals_credentials::VerificationWarning::MissingCredential));
}
