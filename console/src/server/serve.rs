//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::ConsoleError;
use crate::server::handlers::{
    candidates_handler, control_handler, dependencies_handler, dismiss_notification_handler,
    form_handler, health_handler, notifications_handler, priority_handler, refresh_handler,
    sign_in_handler, sign_out_handler, submit_handler, version_handler, view_handler,
    visibility_handler,
};
use crate::server::state::ServerState;

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Deployments view
        .route("/view", get(view_handler))
        .route("/view/visibility", put(visibility_handler))
        .route("/deployments/refresh", post(refresh_handler))
        .route("/controls/{handler_id}", post(control_handler))
        // Session
        .route("/session", post(sign_in_handler).delete(sign_out_handler))
        // Creation form
        .route("/form", get(form_handler))
        .route("/form/candidates", post(candidates_handler))
        .route("/form/priority", put(priority_handler))
        .route("/form/dependencies", put(dependencies_handler))
        .route("/form/submit", post(submit_handler))
        // Notifications
        .route("/notifications", get(notifications_handler))
        .route("/notifications/{id}", delete(dismiss_notification_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ConsoleError>>, ConsoleError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ConsoleError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ConsoleError::ServerError(e.to_string()))
    });

    Ok(handle)
}
