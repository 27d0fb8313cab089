//! In-memory stand-ins for GitHub and the Hub

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use api_models::{DeploymentConfig, Hardware, OwnerInfo, RepositoryInfo, Visibility};
use gh2hf::config::Credentials;
use gh2hf::deploy::job::{DeploymentJob, DeploymentRequest, JobHandle};
use gh2hf::deploy::orchestrator::OrchestratorSettings;
use gh2hf::errors::DeployerError;
use gh2hf::github::{BranchHead, SourceHost};
use gh2hf::hub::{CreateSpaceParams, SpaceHandle, SpaceHost};
use gh2hf::remote::RemoteConnector;
use gh2hf::store::JobStore;
use gh2hf::utils::RepoCoordinates;
use remote_models::github::{Tree, TreeItem};

pub const ROOT_TREE: &str = "root";
pub const DIR_PREFIX: &str = "dir:";

pub fn repository_info(name: &str) -> RepositoryInfo {
    RepositoryInfo {
        id: 42,
        name: name.to_string(),
        full_name: format!("octo/{}", name),
        description: Some("Demo service".to_string()),
        html_url: format!("https://github.com/octo/{}", name),
        clone_url: format!("https://github.com/octo/{}.git", name),
        default_branch: "main".to_string(),
        language: Some("Go".to_string()),
        stargazers_count: 7,
        forks_count: 1,
        private: false,
        owner: OwnerInfo {
            login: "octo".to_string(),
            avatar_url: String::new(),
        },
    }
}

/// Repository whose blobs are keyed by path; a blob's sha is its path
pub struct MockSource {
    pub repository: Option<RepositoryInfo>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub truncated: bool,
    pub failing_blobs: HashSet<String>,
}

impl MockSource {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            repository: Some(repository_info("demo")),
            files: files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
                .collect(),
            truncated: false,
            failing_blobs: HashSet::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), content);
        self
    }

    fn blob(path: &str, content: &[u8]) -> TreeItem {
        TreeItem {
            path: path.to_string(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            sha: path.to_string(),
            size: Some(content.len() as u64),
        }
    }

    /// Direct children of the directory `prefix` ("" for the root)
    fn children(&self, prefix: &str) -> Vec<TreeItem> {
        let mut dirs = BTreeSet::new();
        let mut items = Vec::new();
        for (path, content) in &self.files {
            let Some(rest) = path.strip_prefix(prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => {
                    let mut item = Self::blob(rest, content);
                    item.sha = path.clone();
                    items.push(item);
                }
            }
        }
        for dir in dirs {
            items.push(TreeItem {
                path: dir.clone(),
                mode: "040000".to_string(),
                kind: "tree".to_string(),
                sha: format!("{}{}{}/", DIR_PREFIX, prefix, dir),
                size: None,
            });
        }
        items
    }
}

#[async_trait]
impl SourceHost for MockSource {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo, DeployerError> {
        self.repository
            .clone()
            .ok_or_else(|| DeployerError::NotFound(format!("{}/{}", owner, repo)))
    }

    async fn get_file_text(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
    ) -> Result<Option<String>, DeployerError> {
        Ok(self
            .files
            .get(path)
            .map(|content| String::from_utf8_lossy(content).into_owned()))
    }

    async fn resolve_branch(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<BranchHead, DeployerError> {
        Ok(BranchHead {
            commit_sha: "c0ffee".to_string(),
            tree_sha: ROOT_TREE.to_string(),
        })
    }

    async fn get_tree(
        &self,
        _owner: &str,
        _repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> Result<Tree, DeployerError> {
        if recursive {
            let tree = self
                .files
                .iter()
                .map(|(path, content)| Self::blob(path, content))
                .collect();
            return Ok(Tree {
                sha: tree_sha.to_string(),
                tree,
                truncated: self.truncated,
            });
        }

        let prefix = tree_sha.strip_prefix(DIR_PREFIX).unwrap_or_default();
        Ok(Tree {
            sha: tree_sha.to_string(),
            tree: self.children(prefix),
            truncated: false,
        })
    }

    async fn get_blob(&self, _owner: &str, _repo: &str, sha: &str) -> Result<Vec<u8>, DeployerError> {
        if self.failing_blobs.contains(sha) {
            return Err(DeployerError::remote(502, "Bad Gateway"));
        }
        self.files
            .get(sha)
            .cloned()
            .ok_or_else(|| DeployerError::NotFound(sha.to_string()))
    }

    async fn authenticated_user(&self) -> Result<String, DeployerError> {
        Ok("octocat".to_string())
    }
}

/// Space host recording uploads and replaying a scripted status sequence
pub struct MockSpaces {
    /// Returned in order; the last one repeats
    pub statuses: Vec<String>,
    pub status_calls: AtomicUsize,
    pub create_failures: AtomicUsize,
    pub created: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
    pub failing_uploads: HashSet<String>,
    /// Every status call fails with this error when set
    pub status_error: Option<(u16, String)>,
    /// Job whose progress is sampled on every status call
    pub watched_job: Mutex<Option<JobHandle>>,
    pub observed_progress: Mutex<Vec<u8>>,
}

impl MockSpaces {
    pub fn new(statuses: &[&str]) -> Self {
        Self {
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            status_calls: AtomicUsize::new(0),
            create_failures: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            failing_uploads: HashSet::new(),
            status_error: None,
            watched_job: Mutex::new(None),
            observed_progress: Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn uploaded(&self, path: &str) -> Option<Vec<u8>> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.clone())
    }
}

#[async_trait]
impl SpaceHost for MockSpaces {
    async fn create_space(&self, params: &CreateSpaceParams) -> Result<SpaceHandle, DeployerError> {
        let pending = self.create_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.create_failures.store(pending - 1, Ordering::SeqCst);
            return Err(DeployerError::remote(500, "Internal Server Error"));
        }

        let id = format!("alice/{}", params.name);
        let mut created = self.created.lock().unwrap();
        if created.contains(&id) {
            return Err(DeployerError::remote(409, "You already created this space repo"));
        }
        created.push(id.clone());

        Ok(SpaceHandle {
            url: format!("https://huggingface.co/spaces/{}", id),
            id,
            raw_status: "unknown".to_string(),
            status: "unknown".to_string(),
            visibility: params.visibility,
            hardware: Some(params.hardware.as_str().to_string()),
            sdk: Some(params.sdk.as_str().to_string()),
        })
    }

    async fn upload_file(&self, _space_id: &str, path: &str, content: &[u8]) -> Result<(), DeployerError> {
        if self.failing_uploads.contains(path) {
            return Err(DeployerError::remote(413, "Payload Too Large"));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), content.to_vec()));
        Ok(())
    }

    async fn get_space_status(&self, space_id: &str) -> Result<SpaceHandle, DeployerError> {
        if let Some(job) = self.watched_job.lock().unwrap().as_ref() {
            if let Some(snapshot) = job.snapshot() {
                self.observed_progress.lock().unwrap().push(snapshot.progress);
            }
        }

        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = &self.status_error {
            return Err(DeployerError::remote(*status, message.clone()));
        }
        let raw = self
            .statuses
            .get(call.min(self.statuses.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        Ok(SpaceHandle {
            id: space_id.to_string(),
            url: format!("https://huggingface.co/spaces/{}", space_id),
            status: raw.to_lowercase(),
            raw_status: raw,
            visibility: Visibility::Public,
            hardware: Some("cpu-basic".to_string()),
            sdk: Some("docker".to_string()),
        })
    }

    async fn delete_space(&self, space_id: &str) -> Result<(), DeployerError> {
        self.created.lock().unwrap().retain(|id| id != space_id);
        Ok(())
    }

    async fn whoami(&self) -> Result<String, DeployerError> {
        Ok("alice".to_string())
    }
}

pub struct MockConnector {
    pub source: Arc<MockSource>,
    pub spaces: Arc<MockSpaces>,
}

impl RemoteConnector for MockConnector {
    fn source(&self, _token: Option<&str>) -> Result<Arc<dyn SourceHost>, DeployerError> {
        Ok(self.source.clone())
    }

    fn spaces(&self, _token: &str, _namespace: &str) -> Result<Arc<dyn SpaceHost>, DeployerError> {
        Ok(self.spaces.clone())
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        github_token: Some(SecretString::from("ghp_test".to_string())),
        hf_token: Some(SecretString::from("hf_test".to_string())),
        hf_username: Some("alice".to_string()),
    }
}

/// Orchestrator settings without real waiting
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        build_initial_delay: Duration::ZERO,
        build_poll_interval: Duration::from_millis(1),
        build_max_attempts: 5,
        ..Default::default()
    }
}

pub fn request() -> DeploymentRequest {
    DeploymentRequest {
        coordinates: RepoCoordinates {
            owner: "octo".to_string(),
            repo: "demo".to_string(),
        },
        repo_url: "https://github.com/octo/demo".to_string(),
        repo_info: repository_info("demo"),
        config: DeploymentConfig {
            space_name: "demo-space".to_string(),
            visibility: Visibility::Public,
            hardware: Hardware::CpuBasic,
            description: Some("Demo deployment".to_string()),
            tags: vec!["docker".to_string()],
            port: Some(8080),
        },
    }
}

/// Store a fresh record and return a handle to it
pub fn new_job(store: &Arc<dyn JobStore>, id: &str) -> JobHandle {
    store.set(DeploymentJob::new(id, None));
    JobHandle::new(id, store.clone())
}

/// Poll the store until the job reaches a terminal stage
pub async fn wait_terminal(store: &Arc<dyn JobStore>, id: &str) -> DeploymentJob {
    for _ in 0..2000 {
        if let Some(job) = store.get(id) {
            if job.stage().is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("deployment {} did not finish", id);
}
