//! Rendered deployment list state

use std::collections::HashSet;

use serde::Serialize;
use tokio::time::Instant;

use crate::models::deployment::{Deployment, DeploymentAction, DeploymentId, DeploymentStatus};
use crate::view::projection::{project, StatusBadge};

/// Identity of a rendered row element
pub type ElementId = u64;

/// Identity of a bound control handler
pub type HandlerId = u64;

/// A bound action control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionControl {
    pub action: DeploymentAction,
    pub label: String,
    pub handler_id: HandlerId,
}

/// One-shot highlight marker on a row
///
/// Every arming gets a fresh `marker`, so re-arming an active emphasis
/// restarts the effect instead of extending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emphasis {
    pub marker: u64,
    #[serde(skip)]
    pub expires_at: Instant,
}

impl Emphasis {
    pub fn is_active(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A rendered deployment row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub element_id: ElementId,
    pub deployment_id: DeploymentId,
    pub name: String,
    pub docker_image: String,
    pub priority: String,
    pub required_ram: f64,
    pub required_cpu: f64,
    pub required_gpu: f64,
    pub status: DeploymentStatus,
    pub badge: StatusBadge,
    pub controls: Vec<ActionControl>,
    pub emphasis: Option<Emphasis>,
}

impl Row {
    pub fn actions(&self) -> Vec<DeploymentAction> {
        self.controls.iter().map(|c| c.action).collect()
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        self.emphasis.as_ref().is_some_and(|e| e.is_active(now))
    }
}

/// The deployment list as currently displayed
///
/// Element, handler and marker ids come from counters owned by the view, so
/// two views built through the same sequence of passes compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    rows: Vec<Row>,
    next_element_id: ElementId,
    next_handler_id: HandlerId,
    next_marker: u64,
    /// Number of full rebuilds this view has gone through
    rebuilds: u64,
}

impl ViewState {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: DeploymentId) -> Option<&Row> {
        self.rows.iter().find(|r| r.deployment_id == id)
    }

    pub fn rendered_ids(&self) -> HashSet<DeploymentId> {
        self.rows.iter().map(|r| r.deployment_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Resolve a handler id to the control it is bound to.
    ///
    /// Handlers that were unbound by a rebuild or a control replacement
    /// resolve to `None`.
    pub fn resolve_handler(&self, handler_id: HandlerId) -> Option<(DeploymentId, DeploymentAction)> {
        self.rows.iter().find_map(|row| {
            row.controls
                .iter()
                .find(|c| c.handler_id == handler_id)
                .map(|c| (row.deployment_id, c.action))
        })
    }

    /// Drop emphasis markers that have run their course
    pub fn clear_expired_emphasis(&mut self, now: Instant) -> usize {
        let mut cleared = 0;
        for row in &mut self.rows {
            if row.emphasis.as_ref().is_some_and(|e| !e.is_active(now)) {
                row.emphasis = None;
                cleared += 1;
            }
        }
        cleared
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Discard every row and render `deployments` from scratch
    pub(crate) fn rebuild<'a>(&mut self, deployments: impl IntoIterator<Item = &'a Deployment>) {
        let rows: Vec<Row> = deployments.into_iter().map(|d| self.new_row(d)).collect();
        self.rows = rows;
        self.rebuilds += 1;
    }

    pub(crate) fn bind_control(&mut self, action: DeploymentAction) -> ActionControl {
        self.next_handler_id += 1;
        ActionControl {
            action,
            label: action.label().to_string(),
            handler_id: self.next_handler_id,
        }
    }

    pub(crate) fn arm_emphasis(&mut self, expires_at: Instant) -> Emphasis {
        self.next_marker += 1;
        Emphasis {
            marker: self.next_marker,
            expires_at,
        }
    }

    fn new_row(&mut self, deployment: &Deployment) -> Row {
        let projection = project(deployment);
        self.next_element_id += 1;
        let element_id = self.next_element_id;
        let controls = projection
            .actions
            .iter()
            .map(|action| self.bind_control(*action))
            .collect();

        Row {
            element_id,
            deployment_id: deployment.id,
            name: deployment.name.clone(),
            docker_image: deployment.docker_image.clone(),
            priority: deployment.priority.label().to_string(),
            required_ram: deployment.required_ram,
            required_cpu: deployment.required_cpu,
            required_gpu: deployment.required_gpu,
            status: projection.status,
            badge: projection.badge,
            controls,
            emphasis: None,
        }
    }
}
