//! Dependency/priority rule

use serde::Serialize;

use crate::models::deployment::{Deployment, DeploymentId, DeploymentStatus, Priority};
use crate::store::snapshot::Snapshot;

pub const PRIORITY_WARNING: &str = "Warning: High priority deployments cannot depend on lower \
priority pending deployments. Some selected dependencies may be rejected.";

/// A deployment offered in the dependency selector, as of the last fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyCandidate {
    pub id: DeploymentId,
    pub name: String,
    pub status: DeploymentStatus,
    pub priority: Priority,
}

impl DependencyCandidate {
    pub fn from_deployment(deployment: &Deployment) -> Self {
        Self {
            id: deployment.id,
            name: deployment.name.clone(),
            status: deployment.status,
            priority: deployment.priority,
        }
    }

    /// Option text, e.g. `db (PENDING - Low)`
    pub fn label(&self) -> String {
        format!("{} ({} - {})", self.name, self.status, self.priority.label())
    }
}

/// Advisory finding shown under the dependency selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyWarning {
    pub message: String,
    /// Selected dependencies that triggered the warning
    pub offending: Vec<DeploymentId>,
}

/// Candidates that may be chosen as dependencies; failed and cancelled
/// deployments are never offered.
pub fn selectable_candidates(snapshot: &Snapshot) -> Vec<DependencyCandidate> {
    snapshot
        .iter()
        .filter(|d| d.status.is_selectable_dependency())
        .map(DependencyCandidate::from_deployment)
        .collect()
}

/// A high priority deployment stalls behind an un-started lower one
pub fn is_priority_violation(priority: Priority, dependency: &DependencyCandidate) -> bool {
    priority == Priority::High
        && dependency.status == DeploymentStatus::Pending
        && dependency.priority < Priority::High
}

pub fn validate_dependencies(
    priority: Priority,
    selection: &[DependencyCandidate],
) -> Option<DependencyWarning> {
    let offending: Vec<DeploymentId> = selection
        .iter()
        .filter(|candidate| is_priority_violation(priority, candidate))
        .map(|candidate| candidate.id)
        .collect();

    if offending.is_empty() {
        return None;
    }

    Some(DependencyWarning {
        message: PRIORITY_WARNING.to_string(),
        offending,
    })
}
