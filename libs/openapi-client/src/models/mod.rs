//! API models

use serde::{Deserialize, Serialize};

/// Deployment as returned by `GET /deployments/`
///
/// `status` is transported as a free-form string (the backend emits lowercase
/// values such as `"pending"`); normalization happens on the client side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub id: i64,
    pub name: String,
    pub docker_image: String,
    pub status: String,
    pub priority: u8,
    pub required_ram: f64,
    pub required_cpu: f64,
    pub required_gpu: f64,
    #[serde(default)]
    pub cluster_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub dependency_ids: Vec<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
}

/// Body of `POST /deployments/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    pub name: String,
    pub docker_image: String,
    pub required_ram: f64,
    pub required_cpu: f64,
    pub required_gpu: f64,
    pub priority: u8,
    pub cluster_id: i64,
    #[serde(default)]
    pub dependency_ids: Vec<i64>,
}

/// Error response
///
/// FastAPI returns `{"detail": "..."}`; validation errors carry a list in
/// `detail`, so it is kept as a raw value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Human-readable message, falling back to a generic one
    pub fn message(&self) -> String {
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Null) | None => "An error occurred".to_string(),
            Some(other) => other.to_string(),
        }
    }
}
