//! Source tree walker
//!
//! Lists every uploadable blob of a branch. The recursive tree endpoint is
//! tried first; when GitHub truncates the listing the walk falls back to one
//! request per directory.

use tracing::{debug, warn};

use crate::errors::DeployerError;
use crate::github::SourceHost;

/// Directory prefixes that never reach a Space
pub const EXCLUDED_PREFIXES: [&str; 14] = [
    ".git/",
    ".github/",
    "node_modules/",
    ".venv/",
    "venv/",
    "__pycache__/",
    ".next/",
    ".nuxt/",
    "dist/",
    "build/",
    "out/",
    "coverage/",
    ".cache/",
    "target/",
];

pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// NUL-byte sniffing. Approximate: UTF-16 text counts as binary.
pub fn is_binary(content: &[u8]) -> bool {
    content.contains(&0)
}

/// One file of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub sha: String,
    pub size: u64,
}

/// List the blobs of `branch`, minus excluded directories
pub async fn list_files(
    source: &dyn SourceHost,
    owner: &str,
    repo: &str,
    branch: &str,
) -> Result<Vec<TreeEntry>, DeployerError> {
    let head = source.resolve_branch(owner, repo, branch).await?;
    let tree = source.get_tree(owner, repo, &head.tree_sha, true).await?;

    if !tree.truncated {
        let entries: Vec<TreeEntry> = tree
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob" && !is_excluded(&item.path))
            .map(|item| TreeEntry {
                path: item.path,
                sha: item.sha,
                size: item.size.unwrap_or_default(),
            })
            .collect();
        debug!("Listed {} files in {}/{}@{}", entries.len(), owner, repo, branch);
        return Ok(entries);
    }

    warn!(
        "Recursive listing of {}/{} was truncated, walking directories one by one",
        owner, repo
    );
    walk_manually(source, owner, repo, &head.tree_sha).await
}

async fn walk_manually(
    source: &dyn SourceHost,
    owner: &str,
    repo: &str,
    root_sha: &str,
) -> Result<Vec<TreeEntry>, DeployerError> {
    let mut entries = Vec::new();
    // (directory prefix, tree sha)
    let mut pending = vec![(String::new(), root_sha.to_string())];

    while let Some((prefix, sha)) = pending.pop() {
        let tree = source.get_tree(owner, repo, &sha, false).await?;
        for item in tree.tree {
            let path = format!("{}{}", prefix, item.path);
            match item.kind.as_str() {
                "tree" => {
                    let dir = format!("{}/", path);
                    if !is_excluded(&dir) {
                        pending.push((dir, item.sha));
                    }
                }
                "blob" if !is_excluded(&path) => entries.push(TreeEntry {
                    path,
                    sha: item.sha,
                    size: item.size.unwrap_or_default(),
                }),
                _ => {}
            }
        }
    }

    Ok(entries)
}
