//! GitHub source host: repository metadata, build-artifact inspection and
//! tree walking.

pub mod client;
pub mod inspector;
pub mod profile;
pub mod walker;

use async_trait::async_trait;

use api_models::RepositoryInfo;
use remote_models::github::Tree;

use crate::errors::DeployerError;

/// Commit and root tree a branch currently points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    pub commit_sha: String,
    pub tree_sha: String,
}

/// Read-only view of a source repository host
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Repository metadata. `NotFound` or `Forbidden` when inaccessible.
    async fn get_repository(&self, owner: &str, repo: &str)
        -> Result<RepositoryInfo, DeployerError>;

    /// Text of a file at the default branch, `None` when the path is absent
    async fn get_file_text(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, DeployerError>;

    async fn resolve_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchHead, DeployerError>;

    /// Tree listing; `recursive` expands every subtree in one call
    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> Result<Tree, DeployerError>;

    /// Raw bytes of a blob
    async fn get_blob(&self, owner: &str, repo: &str, sha: &str)
        -> Result<Vec<u8>, DeployerError>;

    /// Login of the token owner
    async fn authenticated_user(&self) -> Result<String, DeployerError>;
}
