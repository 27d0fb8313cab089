//! GitHub REST API models

use serde::{Deserialize, Serialize};

/// Repository owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub clone_url: String,
    pub default_branch: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub private: bool,
    pub owner: RepositoryOwner,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64 with embedded newlines
    pub content: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub tree: TreeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: BranchCommit,
}

/// One entry of a git tree listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeItem {
    pub path: String,
    #[serde(default)]
    pub mode: String,
    /// "blob", "tree" or "commit" (submodule)
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    pub size: Option<u64>,
}

/// `GET /repos/{owner}/{repo}/git/trees/{sha}[?recursive=1]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub sha: String,
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

/// `GET /user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// Error body returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub documentation_url: Option<String>,
}
