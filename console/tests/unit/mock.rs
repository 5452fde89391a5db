//! Test doubles for the backend and the session

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashsync::authn::session::SessionExt;
use dashsync::dashboard::Dashboard;
use dashsync::errors::ConsoleError;
use dashsync::http::deployments::DeploymentsApi;
use dashsync::models::deployment::{DeploymentAction, DeploymentId};
use dashsync::notify::Notifier;
use dashsync::view::reconcile::Reconciler;
use openapi_client::models::{CreateDeploymentRequest, DeploymentInfo};
use tokio::sync::Notify;

pub fn info(id: DeploymentId, status: &str, priority: u8) -> DeploymentInfo {
    DeploymentInfo {
        id,
        name: format!("dep-{}", id),
        docker_image: "nginx:latest".to_string(),
        status: status.to_string(),
        priority,
        required_ram: 1.0,
        required_cpu: 0.5,
        required_gpu: 0.0,
        cluster_id: Some(1),
        user_id: Some(1),
        dependency_ids: Vec::new(),
        created_at: None,
        started_at: None,
    }
}

/// In-memory backend
#[derive(Default)]
pub struct FakeApi {
    deployments: Mutex<Vec<DeploymentInfo>>,
    list_failure: Mutex<Option<(u16, String)>>,
    action_failure: Mutex<Option<(u16, String)>>,
    create_failure: Mutex<Option<(u16, String)>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub fetch_started: Notify,
    pub list_calls: AtomicUsize,
    pub actions: Mutex<Vec<(DeploymentId, DeploymentAction)>>,
    pub created: Mutex<Vec<CreateDeploymentRequest>>,
}

impl FakeApi {
    pub fn new(deployments: Vec<DeploymentInfo>) -> Arc<Self> {
        let api = Self::default();
        *api.deployments.lock().unwrap() = deployments;
        Arc::new(api)
    }

    pub fn set_deployments(&self, deployments: Vec<DeploymentInfo>) {
        *self.deployments.lock().unwrap() = deployments;
    }

    pub fn set_status(&self, id: DeploymentId, status: &str) {
        let mut deployments = self.deployments.lock().unwrap();
        if let Some(d) = deployments.iter_mut().find(|d| d.id == id) {
            d.status = status.to_string();
        }
    }

    pub fn fail_list(&self, status: u16, message: &str) {
        *self.list_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn recover(&self) {
        *self.list_failure.lock().unwrap() = None;
    }

    pub fn fail_actions(&self, status: u16, message: &str) {
        *self.action_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn fail_creates(&self, status: u16, message: &str) {
        *self.create_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    /// Hold every list request until the returned gate is notified
    pub fn hold_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn rejected(failure: &Option<(u16, String)>) -> Result<(), ConsoleError> {
    match failure {
        Some((status, message)) => Err(ConsoleError::Rejected {
            status: *status,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl DeploymentsApi for FakeApi {
    async fn list_deployments(&self, _token: &str) -> Result<Vec<DeploymentInfo>, ConsoleError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_one();

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        rejected(&self.list_failure.lock().unwrap())?;
        Ok(self.deployments.lock().unwrap().clone())
    }

    async fn request_action(
        &self,
        _token: &str,
        deployment_id: DeploymentId,
        action: DeploymentAction,
    ) -> Result<(), ConsoleError> {
        rejected(&self.action_failure.lock().unwrap())?;
        self.actions.lock().unwrap().push((deployment_id, action));

        let mut deployments = self.deployments.lock().unwrap();
        match action {
            DeploymentAction::Delete => deployments.retain(|d| d.id != deployment_id),
            other => {
                let status = match other {
                    DeploymentAction::Start => "running",
                    DeploymentAction::Stop => "stopped",
                    _ => "cancelled",
                };
                if let Some(d) = deployments.iter_mut().find(|d| d.id == deployment_id) {
                    d.status = status.to_string();
                }
            }
        }
        Ok(())
    }

    async fn create_deployment(
        &self,
        _token: &str,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentInfo, ConsoleError> {
        rejected(&self.create_failure.lock().unwrap())?;
        self.created.lock().unwrap().push(request.clone());

        let mut deployments = self.deployments.lock().unwrap();
        let id = deployments.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let mut created = info(id, "pending", request.priority);
        created.name = request.name.clone();
        created.dependency_ids = request.dependency_ids.clone();
        deployments.push(created.clone());
        Ok(created)
    }
}

/// Session that is signed in unless told otherwise
pub struct FakeSession {
    pub authenticated: AtomicBool,
}

impl FakeSession {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            authenticated: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl SessionExt for FakeSession {
    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn bearer_token(&self) -> Result<String, ConsoleError> {
        if self.authenticated.load(Ordering::SeqCst) {
            Ok("test-token".to_string())
        } else {
            Err(ConsoleError::Unauthenticated)
        }
    }
}

pub fn dashboard(api: Arc<FakeApi>, session: Arc<FakeSession>) -> Arc<Dashboard> {
    Arc::new(Dashboard::new(
        api,
        session,
        Reconciler::new(Duration::from_millis(1500)),
        Notifier::new(Duration::from_secs(5)),
    ))
}
