//! GitHub REST client

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use async_trait::async_trait;
use tracing::debug;

use api_models::{OwnerInfo, RepositoryInfo};
use remote_models::github::{AuthenticatedUser, Branch, ContentFile, Repository, Tree};

use crate::errors::DeployerError;
use crate::github::{BranchHead, SourceHost};
use crate::http::client::HttpClient;

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// GitHub API client, optionally authenticated
pub struct GitHubClient {
    http: HttpClient,
    token: Option<SecretString>,
}

impl GitHubClient {
    pub fn new(http: HttpClient, token: Option<&str>) -> Self {
        Self {
            http,
            token: token.map(|t| SecretString::from(t.to_string())),
        }
    }

    fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    /// Build an endpoint URL from unescaped path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DeployerError> {
        let mut url = Url::parse(self.http.base_url())
            .map_err(|e| DeployerError::ConfigError(format!("Invalid GitHub API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DeployerError::ConfigError("GitHub API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map remote status codes onto the inspector's failure kinds
pub fn classify_github_error(err: DeployerError) -> DeployerError {
    match err {
        DeployerError::RemoteError { status: 404, message } => DeployerError::NotFound(message),
        DeployerError::RemoteError {
            status: 401 | 403 | 429,
            message,
        } => DeployerError::Forbidden(message),
        other => other,
    }
}

/// Decode the base64 payload of a contents response
pub fn decode_content(content: &str) -> Result<Vec<u8>, DeployerError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| DeployerError::Internal(format!("Invalid base64 content: {}", e)))
}

/// Public API view of a GitHub repository
pub fn repository_info(repo: Repository) -> RepositoryInfo {
    RepositoryInfo {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        description: repo.description,
        html_url: repo.html_url,
        clone_url: repo.clone_url,
        default_branch: repo.default_branch,
        language: repo.language,
        stargazers_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        private: repo.private,
        owner: OwnerInfo {
            login: repo.owner.login,
            avatar_url: repo.owner.avatar_url,
        },
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryInfo, DeployerError> {
        let url = self.endpoint(&["repos", owner, repo])?;
        let repository: Repository = self
            .http
            .get(url.as_str(), self.token(), Some(ACCEPT_JSON))
            .await
            .map_err(classify_github_error)?;
        Ok(repository_info(repository))
    }

    async fn get_file_text(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, DeployerError> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments)?;

        let value: Option<serde_json::Value> = self
            .http
            .get_optional(url.as_str(), self.token(), Some(ACCEPT_JSON))
            .await
            .map_err(classify_github_error)?;

        // Directories come back as arrays; only single files carry content
        let file = match value {
            Some(value) if value.is_object() => serde_json::from_value::<ContentFile>(value)?,
            _ => return Ok(None),
        };
        let Some(content) = file.content else {
            return Ok(None);
        };

        debug!("Fetched {} ({} bytes) from {}/{}", file.path, file.size, owner, repo);
        let bytes = decode_content(&content)?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn resolve_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchHead, DeployerError> {
        let url = self.endpoint(&["repos", owner, repo, "branches", branch])?;
        let branch: Branch = self
            .http
            .get(url.as_str(), self.token(), Some(ACCEPT_JSON))
            .await
            .map_err(classify_github_error)?;
        Ok(BranchHead {
            commit_sha: branch.commit.sha,
            tree_sha: branch.commit.commit.tree.sha,
        })
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> Result<Tree, DeployerError> {
        let mut url = self.endpoint(&["repos", owner, repo, "git", "trees", tree_sha])?;
        if recursive {
            url.query_pairs_mut().append_pair("recursive", "1");
        }
        self.http
            .get(url.as_str(), self.token(), Some(ACCEPT_JSON))
            .await
            .map_err(classify_github_error)
    }

    async fn get_blob(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<u8>, DeployerError> {
        let url = self.endpoint(&["repos", owner, repo, "git", "blobs", sha])?;
        self.http
            .get_bytes(url.as_str(), self.token(), Some(ACCEPT_RAW))
            .await
            .map_err(classify_github_error)
    }

    async fn authenticated_user(&self) -> Result<String, DeployerError> {
        let url = self.endpoint(&["user"])?;
        let user: AuthenticatedUser = self
            .http
            .get(url.as_str(), self.token(), Some(ACCEPT_JSON))
            .await
            .map_err(classify_github_error)?;
        Ok(user.login)
    }
}
