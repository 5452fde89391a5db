//! Deployment API client

use async_trait::async_trait;
use openapi_client::models::{CreateDeploymentRequest, DeploymentInfo};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::models::deployment::{DeploymentAction, DeploymentId};

/// Backend deployment endpoints, behind a trait for testability
#[async_trait]
pub trait DeploymentsApi: Send + Sync {
    /// `GET /deployments/`
    async fn list_deployments(&self, token: &str) -> Result<Vec<DeploymentInfo>, ConsoleError>;

    /// `POST /deployments/{id}/start|stop|cancel` or `DELETE /deployments/{id}`
    async fn request_action(
        &self,
        token: &str,
        deployment_id: DeploymentId,
        action: DeploymentAction,
    ) -> Result<(), ConsoleError>;

    /// `POST /deployments/`
    async fn create_deployment(
        &self,
        token: &str,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentInfo, ConsoleError>;
}

/// Path and method of an action request
pub fn action_path(deployment_id: DeploymentId, action: DeploymentAction) -> String {
    match action {
        DeploymentAction::Start => format!("/deployments/{}/start", deployment_id),
        DeploymentAction::Stop => format!("/deployments/{}/stop", deployment_id),
        DeploymentAction::Cancel => format!("/deployments/{}/cancel", deployment_id),
        DeploymentAction::Delete => format!("/deployments/{}", deployment_id),
    }
}

#[async_trait]
impl DeploymentsApi for HttpClient {
    async fn list_deployments(&self, token: &str) -> Result<Vec<DeploymentInfo>, ConsoleError> {
        self.get("/deployments/", token).await
    }

    async fn request_action(
        &self,
        token: &str,
        deployment_id: DeploymentId,
        action: DeploymentAction,
    ) -> Result<(), ConsoleError> {
        let path = action_path(deployment_id, action);
        let _: serde_json::Value = match action {
            DeploymentAction::Delete => self.delete(&path, token).await?,
            _ => self.post_empty(&path, token).await?,
        };
        Ok(())
    }

    async fn create_deployment(
        &self,
        token: &str,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentInfo, ConsoleError> {
        self.post("/deployments/", token, request).await
    }
}
