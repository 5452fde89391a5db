//! Deployment creation form state

use std::collections::BTreeSet;

use openapi_client::models::CreateDeploymentRequest;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::models::deployment::{DeploymentId, Priority};
use crate::store::snapshot::Snapshot;
use crate::validate::dependencies::{
    selectable_candidates, validate_dependencies, DependencyCandidate, DependencyWarning,
};

/// Non-dependency fields of the creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentDetails {
    pub name: String,
    pub docker_image: String,
    pub required_ram: f64,
    pub required_cpu: f64,
    pub required_gpu: f64,
    pub cluster_id: i64,
}

/// Serializable view of the form
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub priority: Priority,
    pub candidates: Vec<CandidateOption>,
    pub warning: Option<DependencyWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateOption {
    #[serde(flatten)]
    pub candidate: DependencyCandidate,
    pub label: String,
    pub selected: bool,
}

/// Priority and dependency selection of the in-progress creation form
///
/// Holds at most one warning. Every change clears it before the rule is
/// evaluated again.
#[derive(Debug, Clone, Default)]
pub struct DependencyForm {
    candidates: Vec<DependencyCandidate>,
    priority: Priority,
    selected: BTreeSet<DeploymentId>,
    warning: Option<DependencyWarning>,
}

impl DependencyForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the selectable candidates from a dependency-list fetch.
    ///
    /// Selected ids that are no longer selectable are dropped.
    pub fn set_candidates(&mut self, snapshot: &Snapshot) -> Option<&DependencyWarning> {
        self.candidates = selectable_candidates(snapshot);
        let candidates = &self.candidates;
        self.selected.retain(|id| candidates.iter().any(|c| c.id == *id));
        self.revalidate()
    }

    pub fn set_priority(&mut self, priority: Priority) -> Option<&DependencyWarning> {
        self.priority = priority;
        self.revalidate()
    }

    /// Replace the selection; ids outside the selectable set are refused
    pub fn select(
        &mut self,
        ids: impl IntoIterator<Item = DeploymentId>,
    ) -> Result<Option<&DependencyWarning>, ConsoleError> {
        let ids: BTreeSet<DeploymentId> = ids.into_iter().collect();
        if let Some(id) = ids.iter().find(|id| !self.candidates.iter().any(|c| c.id == **id)) {
            return Err(ConsoleError::ValidationError(format!(
                "deployment {} cannot be selected as a dependency",
                id
            )));
        }
        self.selected = ids;
        Ok(self.revalidate())
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn candidates(&self) -> &[DependencyCandidate] {
        &self.candidates
    }

    pub fn selection(&self) -> Vec<DependencyCandidate> {
        self.candidates
            .iter()
            .filter(|c| self.selected.contains(&c.id))
            .cloned()
            .collect()
    }

    pub fn warning(&self) -> Option<&DependencyWarning> {
        self.warning.as_ref()
    }

    /// Build the create request. The warning never blocks this.
    pub fn create_request(&self, details: DeploymentDetails) -> CreateDeploymentRequest {
        CreateDeploymentRequest {
            name: details.name,
            docker_image: details.docker_image,
            required_ram: details.required_ram,
            required_cpu: details.required_cpu,
            required_gpu: details.required_gpu,
            priority: self.priority.as_u8(),
            cluster_id: details.cluster_id,
            dependency_ids: self.selected.iter().copied().collect(),
        }
    }

    /// Clear the selection after a successful submission
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.warning = None;
    }

    pub fn view(&self) -> FormView {
        FormView {
            priority: self.priority,
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateOption {
                    candidate: c.clone(),
                    label: c.label(),
                    selected: self.selected.contains(&c.id),
                })
                .collect(),
            warning: self.warning.clone(),
        }
    }

    fn revalidate(&mut self) -> Option<&DependencyWarning> {
        self.warning = None;
        self.warning = validate_dependencies(self.priority, &self.selection());
        self.warning.as_ref()
    }
}
