//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::dashboard::{PollState, TickOutcome};
use crate::dashboard::signals::Visibility;
use crate::errors::ConsoleError;
use crate::models::deployment::{DeploymentAction, DeploymentId, Priority};
use crate::notify::Notification;
use crate::server::state::ServerState;
use crate::utils::version_info;
use crate::validate::form::{DeploymentDetails, FormView};
use crate::view::state::{HandlerId, Row};

/// Shown in place of the list when there are no deployments
pub const EMPTY_LIST_MESSAGE: &str = "No deployments found.";

/// Error body, shaped like the backend's
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Maps console errors onto HTTP responses
#[derive(Debug)]
pub struct ApiError(pub ConsoleError);

impl From<ConsoleError> for ApiError {
    fn from(err: ConsoleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ConsoleError::Unauthenticated | ConsoleError::TokenError(_) => StatusCode::UNAUTHORIZED,
            ConsoleError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConsoleError::NotFound(_) => StatusCode::NOT_FOUND,
            ConsoleError::Rejected { .. }
            | ConsoleError::HttpError(_)
            | ConsoleError::MalformedSnapshot(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            detail: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "dashsync".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

// ==================================== VIEW ======================================= //

#[derive(Debug, Serialize)]
pub struct RowView {
    #[serde(flatten)]
    pub row: Row,
    pub highlighted: bool,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub visibility: Visibility,
    pub rows: Vec<RowView>,
    pub empty_message: Option<&'static str>,
    pub rebuilds: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub poll: PollState,
}

/// Current deployments view
pub async fn view_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let dashboard = &state.dashboard;
    let view = dashboard.view().await;
    let now = Instant::now();

    let rows = view
        .rows()
        .iter()
        .map(|row| RowView {
            highlighted: row.is_highlighted(now),
            row: row.clone(),
        })
        .collect();

    Json(ViewResponse {
        visibility: dashboard.signals().current(),
        rows,
        empty_message: view.is_empty().then_some(EMPTY_LIST_MESSAGE),
        rebuilds: view.rebuilds(),
        fetched_at: dashboard.store().fetched_at(),
        poll: dashboard.poll_state().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Show or hide the deployments view
pub async fn visibility_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<VisibilityRequest>,
) -> impl IntoResponse {
    Json(state.dashboard.set_visible(request.visible))
}

/// Run a poll cycle now
pub async fn refresh_handler(State(state): State<Arc<ServerState>>) -> Json<TickOutcome> {
    Json(state.dashboard.refresh().await)
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub deployment_id: DeploymentId,
    pub action: DeploymentAction,
}

/// Fire a bound control
pub async fn control_handler(
    State(state): State<Arc<ServerState>>,
    Path(handler_id): Path<HandlerId>,
) -> Result<Json<ControlResponse>, ApiError> {
    match state.dashboard.dispatch(handler_id).await? {
        Some((deployment_id, action)) => Ok(Json(ControlResponse {
            deployment_id,
            action,
        })),
        None => Err(ConsoleError::NotFound(format!("control handler {}", handler_id)).into()),
    }
}

// =================================== SESSION ===================================== //

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub subject: Option<String>,
}

pub async fn sign_in_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let subject = state.session.sign_in(request.token).await?;
    Ok(Json(SignInResponse { subject }))
}

pub async fn sign_out_handler(State(state): State<Arc<ServerState>>) -> StatusCode {
    state.session.sign_out().await;
    StatusCode::NO_CONTENT
}

// ===================================== FORM ====================================== //

pub async fn form_handler(State(state): State<Arc<ServerState>>) -> Json<FormView> {
    Json(state.dashboard.form().await)
}

/// Reload the dependency candidates
pub async fn candidates_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<FormView>, ApiError> {
    state.dashboard.refresh_candidates().await?;
    Ok(Json(state.dashboard.form().await))
}

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub priority: Priority,
}

pub async fn priority_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<PriorityRequest>,
) -> Json<FormView> {
    state.dashboard.set_priority(request.priority).await;
    Json(state.dashboard.form().await)
}

#[derive(Debug, Deserialize)]
pub struct DependenciesRequest {
    pub ids: Vec<DeploymentId>,
}

pub async fn dependencies_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<DependenciesRequest>,
) -> Result<Json<FormView>, ApiError> {
    state.dashboard.select_dependencies(request.ids).await?;
    Ok(Json(state.dashboard.form().await))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: DeploymentId,
}

pub async fn submit_handler(
    State(state): State<Arc<ServerState>>,
    Json(details): Json<DeploymentDetails>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let id = state.dashboard.submit(details).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

// ================================= NOTIFICATIONS ================================= //

pub async fn notifications_handler(
    State(state): State<Arc<ServerState>>,
) -> Json<Option<Notification>> {
    Json(state.dashboard.notifier().active())
}

pub async fn dismiss_notification_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.dashboard.notifier().dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
