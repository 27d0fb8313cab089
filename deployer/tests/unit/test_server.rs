//! HTTP API tests driven through the router

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use gh2hf::app::options::AppOptions;
use gh2hf::app::state::AppState;
use gh2hf::config::Settings;
use gh2hf::server::serve::router;
use gh2hf::server::state::ServerState;
use gh2hf::store::JobStore;

use crate::mocks::{
    credentials, fast_settings, repository_info, wait_terminal, MockConnector, MockSource,
    MockSpaces,
};

fn app_with(source: MockSource) -> (Router, Arc<dyn JobStore>) {
    let settings = Arc::new(Settings {
        credentials: Arc::new(credentials()),
        ..Default::default()
    });
    let options = AppOptions {
        orchestrator: fast_settings(),
        ..Default::default()
    };
    let connector = Arc::new(MockConnector {
        source: Arc::new(source),
        spaces: Arc::new(MockSpaces::new(&["BUILDING", "RUNNING"])),
    });

    let app_state = AppState::with_connector(settings, &options, connector);
    let store = app_state.store.clone();
    let state = Arc::new(ServerState::new(
        app_state.settings.clone(),
        app_state.connector.clone(),
        app_state.store.clone(),
        app_state.runner.clone(),
    ));
    (router(state), store)
}

fn app() -> (Router, Arc<dyn JobStore>) {
    app_with(MockSource::new(&[
        ("Dockerfile", "FROM node:20\nEXPOSE 3000 8080/tcp\nCMD [\"node\", \"server.js\"]\n"),
        ("server.js", "require('http').createServer().listen(3000)\n"),
    ]))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn deploy_body() -> Value {
    json!({
        "repoUrl": "https://github.com/octo/demo",
        "repoInfo": serde_json::to_value(repository_info("demo")).unwrap(),
        "deploymentConfig": {
            "spaceName": "demo-space",
            "visibility": "public",
            "hardware": "cpu-basic",
            "tags": ["docker"],
            "port": 3000
        }
    })
}

#[tokio::test]
async fn test_health_reports_success() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["checks"]["environment"]["status"], "success");
    assert_eq!(body["checks"]["huggingface"]["status"], "success");
}

#[tokio::test]
async fn test_repo_lookup() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/github/repo?owner=octo")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, get("/api/github/repo?owner=octo&repo=demo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fullName"], "octo/demo");
    assert_eq!(body["data"]["defaultBranch"], "main");
}

#[tokio::test]
async fn test_repo_lookup_not_found() {
    let mut source = MockSource::new(&[]);
    source.repository = None;
    let (app, _) = app_with(source);

    let (status, body) = send(&app, get("/api/github/repo?owner=octo&repo=gone")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("octo/gone"));
}

#[tokio::test]
async fn test_docker_detection() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/github/docker?owner=octo&repo=demo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hasDockerfile"], true);
    assert_eq!(body["data"]["hasDockerCompose"], false);
    assert_eq!(body["data"]["exposedPorts"], json!([3000, 8080]));
    assert_eq!(body["data"]["baseImage"], "node:20");
}

#[tokio::test]
async fn test_deploy_requires_all_fields() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post("/api/huggingface/deploy", json!({ "repoUrl": "https://github.com/octo/demo" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut bad_url = deploy_body();
    bad_url["repoUrl"] = json!("https://gitlab.com/octo/demo");
    let (status, _) = send(&app, post("/api/huggingface/deploy", bad_url)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/huggingface/deploy")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deploy_then_poll_status() {
    let (app, store) = app();

    let (status, body) = send(&app, post("/api/huggingface/deploy", deploy_body())).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["deploymentId"].as_str().unwrap().to_string();
    assert!(id.starts_with("deploy_"));

    let (status, body) = send(&app, get(&format!("/api/huggingface/status?deploymentId={}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deploymentId"], id.as_str());

    wait_terminal(&store, &id).await;

    let (status, body) = send(&app, get(&format!("/api/huggingface/status?deploymentId={}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stage"], "completed");
    assert_eq!(body["data"]["progress"], 100);
    assert_eq!(
        body["data"]["spaceUrl"],
        "https://huggingface.co/spaces/alice/demo-space"
    );

    let (status, _) = send(
        &app,
        post("/api/huggingface/retry", json!({ "deploymentId": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_and_retry_errors() {
    let (app, _) = app();

    let (status, _) = send(&app, get("/api/huggingface/status")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/huggingface/status?deploymentId=deploy_missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        post("/api/huggingface/retry", json!({ "deploymentId": "deploy_missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, post("/api/huggingface/retry", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
