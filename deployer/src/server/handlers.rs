//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use api_models::{
    ApiResponse, DeployAccepted, DeployRequest, DeploymentQuery, RepoQuery, RetryRequest,
};

use crate::deploy::job::DeploymentRequest;
use crate::diagnostics::run_checks;
use crate::errors::DeployerError;
use crate::github::inspector::inspect;
use crate::server::state::ServerState;
use crate::utils::{parse_github_url, version_info};

/// Query values that are absent or blank count as missing
fn required(value: Option<String>, name: &str) -> Result<String, DeployerError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DeployerError::MissingParameter(name.to_string()))
}

fn repo_params(query: RepoQuery) -> Result<(String, String), DeployerError> {
    match (required(query.owner, "owner"), required(query.repo, "repo")) {
        (Ok(owner), Ok(repo)) => Ok((owner, repo)),
        _ => Err(DeployerError::MissingParameter("owner and repo".to_string())),
    }
}

/// Configuration health report
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let report = run_checks(&state.settings.credentials, state.connector.as_ref()).await;
    Json(report)
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

/// Repository metadata
pub async fn repo_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<RepoQuery>,
) -> Result<impl IntoResponse, DeployerError> {
    let (owner, repo) = repo_params(query)?;
    let source = state
        .connector
        .source(state.settings.credentials.github_token())?;

    let info = source.get_repository(&owner, &repo).await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// Build artifact detection plus project profile
pub async fn docker_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<RepoQuery>,
) -> Result<impl IntoResponse, DeployerError> {
    let (owner, repo) = repo_params(query)?;
    let source = state
        .connector
        .source(state.settings.credentials.github_token())?;

    let detection = inspect(source.as_ref(), &owner, &repo).await?;
    Ok(Json(ApiResponse::ok(detection)))
}

/// Accept a deployment and start it in the background
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<impl IntoResponse, DeployerError> {
    let Json(body) = payload.map_err(|e| DeployerError::ValidationError(e.body_text()))?;

    let (Some(repo_url), Some(repo_info), Some(config)) =
        (body.repo_url, body.repo_info, body.deployment_config)
    else {
        return Err(DeployerError::MissingParameter(
            "repoUrl, repoInfo and deploymentConfig are required".to_string(),
        ));
    };

    let coordinates = parse_github_url(&repo_url).ok_or_else(|| {
        DeployerError::MissingParameter(format!("repoUrl is not a GitHub repository: {}", repo_url))
    })?;

    let deployment_id = state.runner.submit(DeploymentRequest {
        coordinates,
        repo_url,
        repo_info,
        config,
    });
    info!("Deployment {} submitted", deployment_id);

    Ok(Json(ApiResponse::ok(DeployAccepted { deployment_id })))
}

/// Current record of a deployment
pub async fn status_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DeploymentQuery>,
) -> Result<impl IntoResponse, DeployerError> {
    let id = required(query.deployment_id, "deploymentId")?;
    let job = state
        .store
        .get(&id)
        .ok_or_else(|| DeployerError::NotFound(format!("deployment {}", id)))?;
    Ok(Json(ApiResponse::ok(job)))
}

/// Restart a failed deployment
pub async fn retry_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RetryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, DeployerError> {
    let Json(body) = payload.map_err(|e| DeployerError::ValidationError(e.body_text()))?;
    let id = required(body.deployment_id, "deploymentId")?;

    state.runner.retry(&id)?;
    Ok(Json(ApiResponse::ok(DeployAccepted { deployment_id: id })))
}
