//! Local HTTP server tests

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dashsync::authn::session::{AccessToken, Session};
use dashsync::dashboard::Dashboard;
use dashsync::notify::Notifier;
use dashsync::server::serve::router;
use dashsync::server::state::ServerState;
use dashsync::view::reconcile::Reconciler;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::mock::{info, FakeApi};

fn app(api: Arc<FakeApi>) -> (Router, Arc<Dashboard>) {
    let session = Arc::new(Session::with_token(
        AccessToken::from_raw("opaque-token".to_string()).unwrap(),
    ));
    let dashboard = Arc::new(Dashboard::new(
        api,
        session.clone(),
        Reconciler::new(Duration::from_millis(1500)),
        Notifier::new(Duration::from_secs(5)),
    ));
    let state = Arc::new(ServerState::new(session, dashboard.clone()));
    (router(state), dashboard)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(FakeApi::new(vec![]));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "dashsync");
}

#[tokio::test]
async fn test_empty_view_shows_placeholder() {
    let (app, _) = app(FakeApi::new(vec![]));
    send(&app, "PUT", "/view/visibility", Some(json!({"visible": true}))).await;

    let (status, body) = send(&app, "POST", "/deployments/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "reconciled");

    let (_, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(body["empty_message"], "No deployments found.");
    assert_eq!(body["rows"], json!([]));
}

#[tokio::test]
async fn test_hidden_refresh_reports_hidden() {
    let api = FakeApi::new(vec![info(1, "pending", 1)]);
    let (app, _) = app(api.clone());

    let (_, body) = send(&app, "POST", "/deployments/refresh", None).await;
    assert_eq!(body["result"], "hidden");
    assert_eq!(api.list_calls(), 0);
}

#[tokio::test]
async fn test_view_and_control_dispatch() {
    let api = FakeApi::new(vec![info(7, "pending", 3)]);
    let (app, _) = app(api.clone());

    let (_, visibility) = send(&app, "PUT", "/view/visibility", Some(json!({"visible": true}))).await;
    assert_eq!(visibility["visible"], true);
    send(&app, "POST", "/deployments/refresh", None).await;

    let (status, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    let row = &body["rows"][0];
    assert_eq!(row["deployment_id"], 7);
    assert_eq!(row["status"], "PENDING");
    assert_eq!(row["priority"], "High");
    assert_eq!(row["highlighted"], false);
    assert_eq!(body["empty_message"], Value::Null);

    let start = row["controls"][0]["handler_id"].as_u64().unwrap();
    let (status, body) = send(&app, "POST", &format!("/controls/{}", start), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "start");

    let (_, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(body["rows"][0]["status"], "RUNNING");
    assert_eq!(body["rows"][0]["highlighted"], true);

    // the start control no longer exists
    let (status, _) = send(&app, "POST", &format!("/controls/{}", start), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, notification) = send(&app, "GET", "/notifications", None).await;
    assert_eq!(notification["level"], "success");
    let id = notification["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, "DELETE", &format!("/notifications/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, notification) = send(&app, "GET", "/notifications", None).await;
    assert_eq!(notification, Value::Null);
}

#[tokio::test]
async fn test_backend_rejection_maps_to_bad_gateway() {
    let api = FakeApi::new(vec![info(1, "running", 2)]);
    let (app, dashboard) = app(api.clone());
    dashboard.set_visible(true);
    dashboard.refresh().await;
    api.fail_actions(400, "Deployment is not running");

    let stop = dashboard.view().await.row(1).unwrap().controls[0].handler_id;
    let (status, body) = send(&app, "POST", &format!("/controls/{}", stop), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["detail"], "Deployment is not running");
}

#[tokio::test]
async fn test_form_routes() {
    let api = FakeApi::new(vec![info(1, "pending", 1), info(2, "failed", 1)]);
    let (app, _) = app(api.clone());

    let (status, form) = send(&app, "POST", "/form/candidates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["candidates"].as_array().unwrap().len(), 1);

    let (_, form) = send(&app, "PUT", "/form/priority", Some(json!({"priority": 3}))).await;
    assert_eq!(form["priority"], 3);

    let (status, _) = send(&app, "PUT", "/form/dependencies", Some(json!({"ids": [2]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, form) = send(&app, "PUT", "/form/dependencies", Some(json!({"ids": [1]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["warning"]["offending"], json!([1]));

    let (status, created) = send(
        &app,
        "POST",
        "/form/submit",
        Some(json!({
            "name": "web",
            "docker_image": "nginx:latest",
            "required_ram": 1.0,
            "required_cpu": 1.0,
            "required_gpu": 0.0,
            "cluster_id": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 3);
    assert_eq!(api.created.lock().unwrap()[0].dependency_ids, vec![1]);
}

#[tokio::test]
async fn test_session_routes() {
    let api = FakeApi::new(vec![info(1, "pending", 1)]);
    let (app, dashboard) = app(api.clone());
    dashboard.set_visible(true);

    let (status, _) = send(&app, "DELETE", "/session", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "POST", "/deployments/refresh", None).await;
    assert_eq!(body["result"], "unauthenticated");

    let (status, body) = send(&app, "POST", "/session", Some(json!({"token": " "}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].as_str().unwrap().contains("empty"));

    let (status, body) = send(&app, "POST", "/session", Some(json!({"token": "abc"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], Value::Null);
    let (_, body) = send(&app, "POST", "/deployments/refresh", None).await;
    assert_eq!(body["result"], "reconciled");
}
