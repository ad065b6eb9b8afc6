//! Compensation log for one authorization.
//!
//! Provisioning touches up to two devices over several calls with no
//! transaction underneath. Each state change is recorded with its undo:
//! created instances are deleted, overwritten resources are written back
//! with the values read before the overwrite. Deletions of superseded
//! instances are deferred until the authorization commits.

use peergrant_core::grant::ObjectPath;
use peergrant_core::model::Resource;

use crate::directory::Registration;
use crate::obs::PeerGrantMetrics;
use crate::peer::PeerClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    Delete { object_id: u16, instance_id: u16 },
    Restore { object_id: u16, instance_id: u16, resources: Vec<Resource> },
}

#[derive(Debug, Clone)]
struct Step {
    target: Registration,
    undo: Undo,
}

#[derive(Debug, Default)]
pub struct ProvisionLog {
    steps: Vec<Step>,
    deferred: Vec<(Registration, u16, u16)>,
}

/// What a rollback managed to undo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RollbackReport {
    pub undone: usize,
    pub failed: usize,
}

impl RollbackReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl ProvisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, target: &Registration, path: ObjectPath) {
        let Some(instance_id) = path.instance_id else {
            tracing::warn!(
                peer = %target.endpoint(),
                %path,
                "created path names no instance, cannot undo"
            );
            return;
        };
        self.steps.push(Step {
            target: target.clone(),
            undo: Undo::Delete {
                object_id: path.object_id,
                instance_id,
            },
        });
    }

    /// Record a write-update. `previous` holds the overwritten resources as
    /// they were before the write; resources that did not exist cannot be
    /// unset and are left in place on rollback.
    pub fn record_overwritten(
        &mut self,
        target: &Registration,
        object_id: u16,
        instance_id: u16,
        previous: Vec<Resource>,
    ) {
        if previous.is_empty() {
            tracing::warn!(
                peer = %target.endpoint(),
                object_id,
                instance_id,
                "update is not reversible, nothing to restore"
            );
            return;
        }
        self.steps.push(Step {
            target: target.clone(),
            undo: Undo::Restore {
                object_id,
                instance_id,
                resources: previous,
            },
        });
    }

    /// Delete `/object_id/instance_id` once the authorization commits.
    pub fn defer_delete(&mut self, target: &Registration, object_id: u16, instance_id: u16) {
        self.deferred.push((target.clone(), object_id, instance_id));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Recorded undo actions, oldest first.
    pub fn undo_actions(&self) -> impl Iterator<Item = (&Registration, &Undo)> {
        self.steps.iter().map(|s| (&s.target, &s.undo))
    }

    /// Run deferred deletions. Failures leave an orphaned instance behind
    /// and are only logged.
    pub async fn commit(self, peer: &PeerClient) {
        for (target, object_id, instance_id) in self.deferred {
            if let Err(e) = peer.delete_instance(&target, object_id, instance_id).await {
                tracing::warn!(
                    peer = %target.endpoint(),
                    object_id,
                    instance_id,
                    error = %e,
                    "superseded instance not deleted"
                );
            }
        }
    }

    /// Undo every recorded step in reverse order, best effort.
    pub async fn rollback(self, peer: &PeerClient, metrics: &PeerGrantMetrics) -> RollbackReport {
        let mut report = RollbackReport::default();
        if self.steps.is_empty() {
            return report;
        }

        for step in self.steps.into_iter().rev() {
            let res = match step.undo {
                Undo::Delete { object_id, instance_id } => {
                    peer.delete_instance(&step.target, object_id, instance_id).await
                }
                Undo::Restore { object_id, instance_id, resources } => {
                    peer.write_update(&step.target, object_id, instance_id, resources).await
                }
            };
            match res {
                Ok(()) => report.undone += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        peer = %step.target.endpoint(),
                        error = %e,
                        "rollback step failed"
                    );
                }
            }
        }

        let outcome = if report.is_complete() { "complete" } else { "partial" };
        metrics.rollbacks.inc(&[("outcome", outcome)]);
        tracing::info!(
            undone = report.undone,
            failed = report.failed,
            outcome,
            "provisioning rolled back"
        );
        report
    }
}
