//! Error types for the deployer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use api_models::ApiResponse;

/// Main error type for the deployer
#[derive(Error, Debug)]
pub enum DeployerError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Not found or inaccessible: {0}")]
    NotFound(String),

    #[error("Access forbidden or rate limited: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A remote call answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    RemoteError { status: u16, message: String },

    #[error("Space build never started: {0}")]
    BuildNeverStarted(String),

    #[error("Space build failed: {0}")]
    BuildFailed(String),

    #[error("Space build timed out: {0}")]
    BuildTimedOut(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployerError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        DeployerError::RemoteError {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RemoteError { .. }
            | Self::BuildNeverStarted(_)
            | Self::BuildFailed(_)
            | Self::BuildTimedOut(_)
            | Self::IoError(_)
            | Self::JsonError(_)
            | Self::HttpError(_)
            | Self::ConfigError(_)
            | Self::ServerError(_)
            | Self::ShutdownError(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for DeployerError {
    fn from(err: anyhow::Error) -> Self {
        DeployerError::Internal(err.to_string())
    }
}

impl IntoResponse for DeployerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}
