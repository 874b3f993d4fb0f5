//! The migration attempt state machine (§4.12): `VALIDATING -> CHECKPOINTED
//! -> IN_PROGRESS -> COMPLETED | FAILED -> QUARANTINE`. `QUARANTINE` is only
//! reached from `FAILED`, for attempts where a side effect (a broadcast
//! Bitcoin transaction, a published webvh log entry) makes a clean rollback
//! unsafe and the asset needs operator attention instead.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use originals_core::{Layer, OriginalsError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationState {
    Validating,
    Checkpointed,
    InProgress,
    Completed,
    Failed,
    Quarantine,
}

fn is_allowed_state_transition(from: MigrationState, to: MigrationState) -> bool {
    use MigrationState::*;
    matches!(
        (from, to),
        (Validating, Checkpointed)
            | (Validating, Failed)
            | (Checkpointed, InProgress)
            | (Checkpointed, Failed)
            | (InProgress, Completed)
            | (InProgress, Failed)
            | (Failed, Quarantine)
    )
}

/// One migration's progress through the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationAttempt {
    pub id: String,
    pub asset_id: String,
    pub from_layer: Layer,
    pub to_layer: Layer,
    pub state: MigrationState,
    pub checkpoint_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub failure_reason: Option<String>,
}

/// Tracks in-flight migration attempts by id, enforcing the transition table
/// above on every state change.
#[derive(Default)]
pub struct MigrationTracker {
    attempts: HashMap<String, MigrationAttempt>,
}

impl MigrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: String, asset_id: String, from_layer: Layer, to_layer: Layer, now: DateTime<Utc>) -> &MigrationAttempt {
        let attempt = MigrationAttempt {
            id: id.clone(),
            asset_id,
            from_layer,
            to_layer,
            state: MigrationState::Validating,
            checkpoint_id: None,
            started_at: now,
            updated_at: now,
            failure_reason: None,
        };
        self.attempts.insert(id.clone(), attempt);
        self.attempts.get(&id).expect("just inserted")
    }

    pub fn get(&self, id: &str) -> Option<&MigrationAttempt> {
        self.attempts.get(id)
    }

    /// Move `id` to `to`, rejecting any transition not in the table above.
    pub fn transition(&mut self, id: &str, to: MigrationState, now: DateTime<Utc>) -> Result<(), OriginalsError> {
        let attempt = self.attempts.get_mut(id).ok_or_else(|| OriginalsError::NotFound(format!("migration attempt {id}")))?;
        if !is_allowed_state_transition(attempt.state, to) {
            return Err(OriginalsError::InvalidTransition { from: format!("{:?}", attempt.state), to: format!("{:?}", to) });
        }
        attempt.state = to;
        attempt.updated_at = now;
        Ok(())
    }

    pub fn set_checkpoint(&mut self, id: &str, checkpoint_id: String) -> Result<(), OriginalsError> {
        let attempt = self.attempts.get_mut(id).ok_or_else(|| OriginalsError::NotFound(format!("migration attempt {id}")))?;
        attempt.checkpoint_id = Some(checkpoint_id);
        Ok(())
    }

    pub fn fail(&mut self, id: &str, reason: String, now: DateTime<Utc>) -> Result<(), OriginalsError> {
        {
            let attempt = self.attempts.get_mut(id).ok_or_else(|| OriginalsError::NotFound(format!("migration attempt {id}")))?;
            attempt.failure_reason = Some(reason);
        }
        self.transition(id, MigrationState::Failed, now)
    }

    pub fn quarantine(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), OriginalsError> {
        self.transition(id, MigrationState::Quarantine, now)
    }

    pub fn remove(&mut self, id: &str) -> Option<MigrationAttempt> {
        self.attempts.remove(id)
    }

    pub fn pending_count(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_success_path_is_allowed() {
        let mut tracker = MigrationTracker::new();
        let now = Utc::now();
        tracker.start("m1".into(), "asset-1".into(), Layer::Peer, Layer::Webvh, now);
        tracker.transition("m1", MigrationState::Checkpointed, now).unwrap();
        tracker.transition("m1", MigrationState::InProgress, now).unwrap();
        tracker.transition("m1", MigrationState::Completed, now).unwrap();
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Completed);
    }

    #[test]
    fn failed_can_escalate_to_quarantine() {
        let mut tracker = MigrationTracker::new();
        let now = Utc::now();
        tracker.start("m1".into(), "asset-1".into(), Layer::Peer, Layer::Webvh, now);
        tracker.transition("m1", MigrationState::Checkpointed, now).unwrap();
        tracker.transition("m1", MigrationState::InProgress, now).unwrap();
        tracker.fail("m1", "broadcast failed".into(), now).unwrap();
        tracker.quarantine("m1", now).unwrap();
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Quarantine);
    }

    #[test]
    fn skipping_checkpointed_is_rejected() {
        let mut tracker = MigrationTracker::new();
        let now = Utc::now();
        tracker.start("m1".into(), "asset-1".into(), Layer::Peer, Layer::Webvh, now);
        let err = tracker.transition("m1", MigrationState::InProgress, now).unwrap_err();
        assert!(matches!(err, OriginalsError::InvalidTransition { .. }));
    }

    #[test]
    fn completed_is_terminal() {
        let mut tracker = MigrationTracker::new();
        let now = Utc::now();
        tracker.start("m1".into(), "asset-1".into(), Layer::Peer, Layer::Webvh, now);
        tracker.transition("m1", MigrationState::Checkpointed, now).unwrap();
        tracker.transition("m1", MigrationState::InProgress, now).unwrap();
        tracker.transition("m1", MigrationState::Completed, now).unwrap();
        assert!(tracker.transition("m1", MigrationState::Failed, now).is_err());
    }
}
