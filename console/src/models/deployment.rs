//! Deployment models

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use openapi_client::models::DeploymentInfo;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Backend-assigned deployment identifier
pub type DeploymentId = i64;

/// Deployment status as observed from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentStatus {
    Pending,
    Running,
    Stopped,
    Cancelled,
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "PENDING",
            DeploymentStatus::Running => "RUNNING",
            DeploymentStatus::Stopped => "STOPPED",
            DeploymentStatus::Cancelled => "CANCELLED",
            DeploymentStatus::Failed => "FAILED",
        }
    }

    /// Style class of the status badge, e.g. `badge-running`
    pub fn badge_class(&self) -> String {
        format!("badge-{}", self.as_str().to_lowercase())
    }

    /// Whether a deployment in this status may be chosen as a dependency
    pub fn is_selectable_dependency(&self) -> bool {
        !matches!(self, DeploymentStatus::Failed | DeploymentStatus::Cancelled)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DeploymentStatus::Pending),
            "running" => Ok(DeploymentStatus::Running),
            // the backend reports finished deployments as "completed"
            "stopped" | "completed" => Ok(DeploymentStatus::Stopped),
            "cancelled" | "canceled" => Ok(DeploymentStatus::Cancelled),
            "failed" => Ok(DeploymentStatus::Failed),
            _ => Err(format!("Invalid deployment status: {}", s)),
        }
    }
}

impl Serialize for DeploymentStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeploymentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Deployment priority, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {}", value)),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Priority::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Status transition the client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentAction {
    Start,
    Stop,
    Cancel,
    Delete,
}

impl DeploymentAction {
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentAction::Start => "Start",
            DeploymentAction::Stop => "Stop",
            DeploymentAction::Cancel => "Cancel",
            DeploymentAction::Delete => "Delete",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            DeploymentAction::Start => "Deployment started successfully!",
            DeploymentAction::Stop => "Deployment stopped successfully!",
            DeploymentAction::Cancel => "Deployment cancelled successfully!",
            DeploymentAction::Delete => "Deployment deleted successfully!",
        }
    }
}

/// A deployment as held in the client's read replica
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub name: String,
    pub docker_image: String,
    pub status: DeploymentStatus,
    pub priority: Priority,
    pub required_ram: f64,
    pub required_cpu: f64,
    pub required_gpu: f64,

    /// Ids this deployment depends on, fixed at creation
    #[serde(default)]
    pub dependencies: BTreeSet<DeploymentId>,

    #[serde(default)]
    pub cluster_id: Option<i64>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub started_at: Option<String>,
}

impl TryFrom<DeploymentInfo> for Deployment {
    type Error = ConsoleError;

    fn try_from(info: DeploymentInfo) -> Result<Self, Self::Error> {
        let status = info
            .status
            .parse::<DeploymentStatus>()
            .map_err(|e| ConsoleError::MalformedSnapshot(format!("deployment {}: {}", info.id, e)))?;
        let priority = Priority::try_from(info.priority)
            .map_err(|e| ConsoleError::MalformedSnapshot(format!("deployment {}: {}", info.id, e)))?;

        Ok(Self {
            id: info.id,
            name: info.name,
            docker_image: info.docker_image,
            status,
            priority,
            required_ram: info.required_ram,
            required_cpu: info.required_cpu,
            required_gpu: info.required_gpu,
            dependencies: info.dependency_ids.into_iter().collect(),
            cluster_id: info.cluster_id,
            created_at: info.created_at,
            started_at: info.started_at,
        })
    }
}
