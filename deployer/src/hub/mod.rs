//! Hugging Face Hub: Space lifecycle and build status

pub mod client;
pub mod status;

use async_trait::async_trait;
use serde::Serialize;

use api_models::{Hardware, SpaceSdk, Visibility};

use crate::errors::DeployerError;

/// Remote identity and last reported state of a Space
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceHandle {
    /// `namespace/name`
    pub id: String,
    pub url: String,
    /// Status text exactly as the Hub reported it
    pub raw_status: String,
    /// Lower-cased `raw_status`, input of [`status::classify`]
    pub status: String,
    pub visibility: Visibility,
    pub hardware: Option<String>,
    pub sdk: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSpaceParams {
    pub name: String,
    pub visibility: Visibility,
    pub hardware: Hardware,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub sdk: SpaceSdk,
}

/// Operations against a Space host, all authenticated with one bearer token.
///
/// Remote failures surface as `DeployerError::RemoteError` carrying the
/// remote status and message. Nothing is retried here.
#[async_trait]
pub trait SpaceHost: Send + Sync {
    /// Not idempotent: a second call with the same name fails remotely
    async fn create_space(&self, params: &CreateSpaceParams) -> Result<SpaceHandle, DeployerError>;

    /// One commit per call
    async fn upload_file(
        &self,
        space_id: &str,
        path: &str,
        content: &[u8],
    ) -> Result<(), DeployerError>;

    async fn get_space_status(&self, space_id: &str) -> Result<SpaceHandle, DeployerError>;

    async fn delete_space(&self, space_id: &str) -> Result<(), DeployerError>;

    /// Name of the token owner
    async fn whoami(&self) -> Result<String, DeployerError>;
}
