//! Hugging Face Hub API models

use serde::{Deserialize, Serialize};

/// `POST /api/repos/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepoRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub private: bool,
    pub sdk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRepoResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `DELETE /api/repos/delete`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRepoRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeHardware {
    pub current: Option<String>,
    pub requested: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceRuntime {
    #[serde(default)]
    pub stage: String,
    pub hardware: Option<RuntimeHardware>,
}

/// `GET /api/spaces/{namespace}/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceInfo {
    pub id: String,
    #[serde(default)]
    pub private: bool,
    pub sdk: Option<String>,
    pub runtime: Option<SpaceRuntime>,
}

/// `GET /api/whoami-v2`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmI {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Commit summary line of an NDJSON commit body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitHeader {
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// File operation line of an NDJSON commit body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFile {
    pub content: String,
    pub path: String,
    pub encoding: String,
}

/// One line of `POST /api/spaces/{id}/commit/{revision}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "lowercase")]
pub enum CommitLine {
    Header(CommitHeader),
    File(CommitFile),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub commit_url: Option<String>,
    #[serde(default)]
    pub commit_oid: Option<String>,
}

/// Error body returned by the Hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
