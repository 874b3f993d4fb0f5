//! Pre-flight migration validation (§4.12, `VALIDATING`): everything that
//! can be checked from the asset's current replayed state, before any
//! checkpoint is taken or any external call is made.

use originals_core::{did::is_allowed_transition, FinalityStatus, Layer, OriginalsAsset};

#[derive(Debug, Clone)]
pub struct ValidationCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failure_reasons(&self) -> Vec<String> {
        self.checks.iter().filter(|c| !c.passed).map(|c| c.detail.clone().unwrap_or_else(|| c.name.to_string())).collect()
    }
}

/// Validate a proposed `from -> to` migration of `asset` (§3, §4.12).
pub fn validate_migration(asset: &OriginalsAsset, from: Layer, to: Layer) -> ValidationReport {
    let mut checks = Vec::new();

    checks.push(ValidationCheck {
        name: "forward_transition",
        passed: is_allowed_transition(from, to),
        detail: (!is_allowed_transition(from, to)).then(|| format!("{from:?} -> {to:?} is not a permitted migration path")),
    });

    checks.push(ValidationCheck {
        name: "asset_at_expected_layer",
        passed: asset.current_layer == from,
        detail: (asset.current_layer != from).then(|| format!("asset is currently at {:?}, not {from:?}", asset.current_layer)),
    });

    checks.push(ValidationCheck {
        name: "not_deactivated",
        passed: !asset.deactivated,
        detail: asset.deactivated.then(|| "asset is deactivated".to_string()),
    });

    let already_final = asset.finality == FinalityStatus::Final && asset.current_layer == Layer::Btco;
    checks.push(ValidationCheck {
        name: "not_already_final",
        passed: !already_final,
        detail: already_final.then(|| "asset is already finalized on btco; no further migration is possible".to_string()),
    });

    checks.push(ValidationCheck {
        name: "has_at_least_one_resource",
        passed: !asset.resources.is_empty(),
        detail: asset.resources.is_empty().then(|| "asset has no resources to carry across the migration".to_string()),
    });

    ValidationReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use originals_core::Resource;

    fn asset_with_one_resource() -> OriginalsAsset {
        let mut asset = OriginalsAsset::new("asset-1");
        asset.resources.push(Resource::new_initial("r1", "text", "text/plain", b"hello".to_vec(), Utc::now()));
        asset
    }

    #[test]
    fn valid_peer_to_webvh_migration_passes() {
        let asset = asset_with_one_resource();
        let report = validate_migration(&asset, Layer::Peer, Layer::Webvh);
        assert!(report.passed());
    }

    #[test]
    fn backward_transition_fails() {
        let mut asset = asset_with_one_resource();
        asset.current_layer = Layer::Webvh;
        let report = validate_migration(&asset, Layer::Webvh, Layer::Peer);
        assert!(!report.passed());
    }

    #[test]
    fn already_final_asset_cannot_migrate_again() {
        let mut asset = asset_with_one_resource();
        asset.current_layer = Layer::Btco;
        asset.finality = FinalityStatus::Final;
        let report = validate_migration(&asset, Layer::Btco, Layer::Webvh);
        assert!(!report.passed());
    }

    #[test]
    fn empty_asset_fails_resource_check() {
        let asset = OriginalsAsset::new("asset-1");
        let report = validate_migration(&asset, Layer::Peer, Layer::Webvh);
        assert!(!report.passed());
        assert!(report.failure_reasons().iter().any(|r| r.contains("no resources")));
    }
}
