//! Reconciliation of a fresh snapshot against the rendered view

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::models::deployment::{Deployment, DeploymentId};
use crate::store::snapshot::Snapshot;
use crate::view::projection::project;
use crate::view::state::ViewState;

/// Which path a reconciliation pass took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePath {
    FullRebuild,
    Incremental,
}

/// What a reconciliation pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub path: ReconcilePath,
    /// Rows whose status changed and were highlighted
    pub highlighted: Vec<DeploymentId>,
    /// Controls newly bound in this pass
    pub bound: usize,
    /// Controls unbound in this pass
    pub unbound: usize,
}

/// Reconciler settings
#[derive(Debug, Clone)]
pub struct Reconciler {
    /// How long a status-change highlight stays on a row
    pub highlight_duration: Duration,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            highlight_duration: Duration::from_millis(1500),
        }
    }
}

/// Render a snapshot into an empty view
pub fn render_full_list(snapshot: &Snapshot) -> ViewState {
    let mut view = ViewState::default();
    if !snapshot.is_empty() {
        view.rebuild(snapshot.iter());
    }
    view
}

/// Whether the rendered rows and the fresh snapshot differ in membership
pub fn needs_full_rebuild(view: &ViewState, fresh: &Snapshot) -> bool {
    let rendered = view.rendered_ids();
    let fresh_ids = fresh.ids();

    (rendered.is_empty() && !fresh.is_empty())
        || !fresh_ids.is_subset(&rendered)
        || !rendered.is_subset(&fresh_ids)
}

impl Reconciler {
    pub fn new(highlight_duration: Duration) -> Self {
        Self { highlight_duration }
    }

    /// Bring `view` in line with `fresh`.
    ///
    /// Any membership change rebuilds the whole list. Otherwise rows are
    /// patched in place: status and controls are re-projected, and only
    /// controls whose action differs are rebound.
    pub fn reconcile(&self, mut view: ViewState, fresh: &Snapshot) -> (ViewState, ReconcileOutcome) {
        if needs_full_rebuild(&view, fresh) {
            let unbound = view.rows().iter().map(|r| r.controls.len()).sum();
            view.rebuild(fresh.iter());
            let bound = view.rows().iter().map(|r| r.controls.len()).sum();
            debug!(
                "Membership changed, rebuilt {} rows ({} controls bound, {} unbound)",
                view.rows().len(),
                bound,
                unbound
            );
            return (
                view,
                ReconcileOutcome {
                    path: ReconcilePath::FullRebuild,
                    highlighted: Vec::new(),
                    bound,
                    unbound,
                },
            );
        }

        let by_id: HashMap<DeploymentId, &Deployment> = fresh.iter().map(|d| (d.id, d)).collect();
        let expires_at = Instant::now() + self.highlight_duration;
        let mut outcome = ReconcileOutcome {
            path: ReconcilePath::Incremental,
            highlighted: Vec::new(),
            bound: 0,
            unbound: 0,
        };

        for index in 0..view.rows().len() {
            let deployment_id = view.rows()[index].deployment_id;
            // membership is identical here
            let Some(deployment) = by_id.get(&deployment_id) else {
                continue;
            };
            let projection = project(deployment);

            let status_changed = view.rows()[index].status != projection.status;
            let emphasis = status_changed.then(|| view.arm_emphasis(expires_at));

            let current = view.rows()[index].controls.clone();
            let mut controls = Vec::with_capacity(projection.actions.len());
            for action in &projection.actions {
                match current.iter().find(|c| c.action == *action) {
                    Some(existing) => controls.push(existing.clone()),
                    None => {
                        controls.push(view.bind_control(*action));
                        outcome.bound += 1;
                    }
                }
            }
            outcome.unbound += current
                .iter()
                .filter(|c| !projection.actions.contains(&c.action))
                .count();

            let row = &mut view.rows_mut()[index];
            if let Some(emphasis) = emphasis {
                debug!(
                    "Deployment {} status {} -> {}",
                    deployment_id, row.status, projection.status
                );
                row.emphasis = Some(emphasis);
                outcome.highlighted.push(deployment_id);
            }
            row.status = projection.status;
            row.badge = projection.badge;
            row.controls = controls;
        }

        (view, outcome)
    }
}
