//! Render projection of a single deployment

use serde::Serialize;

use crate::models::deployment::{Deployment, DeploymentAction, DeploymentStatus};

/// Status badge fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub class: String,
}

impl StatusBadge {
    pub fn for_status(status: DeploymentStatus) -> Self {
        Self {
            label: status.as_str().to_string(),
            class: status.badge_class(),
        }
    }
}

/// What a row displays for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub status: DeploymentStatus,
    pub badge: StatusBadge,
    pub actions: Vec<DeploymentAction>,
}

/// Actions offered for a status, in display order
pub fn actions_for(status: DeploymentStatus) -> &'static [DeploymentAction] {
    match status {
        DeploymentStatus::Pending => &[
            DeploymentAction::Start,
            DeploymentAction::Cancel,
            DeploymentAction::Delete,
        ],
        DeploymentStatus::Running => &[DeploymentAction::Stop, DeploymentAction::Delete],
        DeploymentStatus::Stopped | DeploymentStatus::Cancelled | DeploymentStatus::Failed => {
            &[DeploymentAction::Delete]
        }
    }
}

pub fn project(deployment: &Deployment) -> Projection {
    Projection {
        status: deployment.status,
        badge: StatusBadge::for_status(deployment.status),
        actions: actions_for(deployment.status).to_vec(),
    }
}
