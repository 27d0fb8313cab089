//! Deployment orchestrator
//!
//! Runs one job through `validating -> creating -> uploading -> building`
//! and records every step in the job's status record. Failures never
//! escape `run`: they are written into the record instead.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Credentials;
use crate::deploy::fsm::DeploymentEvent;
use crate::deploy::job::{
    DeploymentRequest, JobHandle, UploadSummary, PROGRESS_BUILDING, PROGRESS_CREATING,
    PROGRESS_UPLOAD_END, PROGRESS_UPLOAD_START,
};
use crate::deploy::manifest::{render_manifest, ManifestInput, MANIFEST_FILE};
use crate::errors::DeployerError;
use crate::github::inspector::BUILD_DESCRIPTOR;
use crate::github::walker::{is_binary, list_files};
use crate::github::SourceHost;
use crate::hub::status::{classify, BuildStatus};
use crate::hub::{CreateSpaceParams, SpaceHost};
use crate::remote::RemoteConnector;
use crate::utils::{format_bytes, validate_space_name};

use api_models::SpaceSdk;

/// Orchestrator limits and timings
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Upload stops once this many files went through
    pub max_files_to_upload: usize,

    /// Larger files are skipped
    pub max_file_size: u64,

    /// Wait before the first build status check
    pub build_initial_delay: Duration,

    /// Wait between build status checks
    pub build_poll_interval: Duration,

    pub build_max_attempts: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_files_to_upload: 100,
            max_file_size: 1024 * 1024,
            build_initial_delay: Duration::from_secs(10),
            build_poll_interval: Duration::from_secs(10),
            build_max_attempts: 30,
        }
    }
}

/// Credentials checked by the validating stage
struct ValidCredentials<'a> {
    github_token: &'a str,
    hf_token: &'a str,
    namespace: &'a str,
}

pub struct Orchestrator {
    settings: OrchestratorSettings,
    credentials: Arc<Credentials>,
    connector: Arc<dyn RemoteConnector>,
}

impl Orchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        credentials: Arc<Credentials>,
        connector: Arc<dyn RemoteConnector>,
    ) -> Self {
        Self {
            settings,
            credentials,
            connector,
        }
    }

    /// Run a deployment to a terminal stage
    pub async fn run(&self, job: &JobHandle, request: &DeploymentRequest) {
        info!(deployment_id = %job.id(), "Deploying {} as Space {}", request.repo_url, request.config.space_name);

        match self.execute(job, request).await {
            Ok(space_url) => job.complete(&space_url),
            Err(e) => {
                error!(deployment_id = %job.id(), "Deployment failed: {}", e);
                job.fail(&e.to_string());
            }
        }
    }

    async fn execute(&self, job: &JobHandle, request: &DeploymentRequest) -> Result<String, DeployerError> {
        job.log("Starting deployment");
        job.log(format!("Validating configuration for {}", request.repo_url));
        let credentials = self.validate(request)?;
        job.log("Configuration is valid");

        job.transition(DeploymentEvent::Validated, PROGRESS_CREATING, "Creating Hugging Face Space...");
        let spaces = self.connector.spaces(credentials.hf_token, credentials.namespace)?;
        let source = self.connector.source(Some(credentials.github_token))?;

        job.log(format!(
            "Creating Space {}/{}",
            credentials.namespace, request.config.space_name
        ));
        let space = spaces
            .create_space(&CreateSpaceParams {
                name: request.config.space_name.clone(),
                visibility: request.config.visibility,
                hardware: request.config.hardware,
                description: request.config.description.clone(),
                tags: request.config.tags.clone(),
                sdk: SpaceSdk::Docker,
            })
            .await?;
        job.log(format!("Space {} created", space.id));

        job.transition(DeploymentEvent::SpaceCreated, PROGRESS_UPLOAD_START, "Uploading repository files...");
        self.upload(job, source.as_ref(), spaces.as_ref(), &space.id, request)
            .await?;

        job.transition(DeploymentEvent::FilesUploaded, PROGRESS_BUILDING, "Building Space...");
        self.await_build(job, spaces.as_ref(), &space.id).await?;

        Ok(space.url)
    }

    fn validate(&self, request: &DeploymentRequest) -> Result<ValidCredentials<'_>, DeployerError> {
        let missing = self.credentials.missing();
        if !missing.is_empty() {
            return Err(DeployerError::ValidationError(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        if !validate_space_name(&request.config.space_name) {
            return Err(DeployerError::ValidationError(format!(
                "Invalid Space name '{}': use 2-96 lowercase letters, digits or hyphens",
                request.config.space_name
            )));
        }

        match (
            self.credentials.github_token(),
            self.credentials.hf_token(),
            self.credentials.hf_username.as_deref(),
        ) {
            (Some(github_token), Some(hf_token), Some(namespace)) => Ok(ValidCredentials {
                github_token,
                hf_token,
                namespace,
            }),
            _ => Err(DeployerError::ValidationError(
                "Missing required credentials".to_string(),
            )),
        }
    }

    /// Copy the default branch into the Space
    async fn upload(
        &self,
        job: &JobHandle,
        source: &dyn SourceHost,
        spaces: &dyn SpaceHost,
        space_id: &str,
        request: &DeploymentRequest,
    ) -> Result<UploadSummary, DeployerError> {
        let owner = request.coordinates.owner.as_str();
        let repo = request.coordinates.repo.as_str();

        let repository = source.get_repository(owner, repo).await?;
        let branch = repository.default_branch;
        job.log(format!("Fetching file list of {}/{} ({})", owner, repo, branch));

        let entries = list_files(source, owner, repo, &branch).await?;
        if entries.is_empty() {
            return Err(DeployerError::ValidationError(format!(
                "No uploadable files found in {}/{}",
                owner, repo
            )));
        }
        job.log(format!("Found {} files to process", entries.len()));

        let limits = &self.settings;
        let mut summary = UploadSummary {
            total: entries.len(),
            ..Default::default()
        };
        let mut has_descriptor = false;
        let mut has_manifest = false;

        for (index, entry) in entries.iter().enumerate() {
            if summary.uploaded >= limits.max_files_to_upload {
                summary.skipped_at_limit = entries.len() - index;
                job.log(format!(
                    "Reached the limit of {} files, {} remaining files were not uploaded",
                    limits.max_files_to_upload, summary.skipped_at_limit
                ));
                break;
            }

            if entry.size > limits.max_file_size {
                summary.skipped_large += 1;
                job.log(format!("Skipped {} ({}, too large)", entry.path, format_bytes(entry.size)));
                continue;
            }

            let content = match source.get_blob(owner, repo, &entry.sha).await {
                Ok(content) => content,
                Err(e) => {
                    summary.failed += 1;
                    warn!(deployment_id = %job.id(), "Could not fetch {}: {}", entry.path, e);
                    job.log(format!("Failed to fetch {}: {}", entry.path, e));
                    continue;
                }
            };

            // Tree listings may omit sizes
            if content.len() as u64 > limits.max_file_size {
                summary.skipped_large += 1;
                job.log(format!(
                    "Skipped {} ({}, too large)",
                    entry.path,
                    format_bytes(content.len() as u64)
                ));
                continue;
            }

            if is_binary(&content) {
                summary.skipped_binary += 1;
                debug!(deployment_id = %job.id(), "Skipped binary file {}", entry.path);
                continue;
            }

            match spaces.upload_file(space_id, &entry.path, &content).await {
                Ok(()) => {
                    summary.uploaded += 1;
                    has_descriptor |= entry.path == BUILD_DESCRIPTOR;
                    has_manifest |= entry.path == MANIFEST_FILE;
                    job.log(format!("Uploaded {}", entry.path));
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(deployment_id = %job.id(), "Could not upload {}: {}", entry.path, e);
                    job.log(format!("Failed to upload {}: {}", entry.path, e));
                }
            }

            job.progress(upload_progress(index + 1, entries.len()));
        }

        job.record_summary(&summary);
        job.log(format!(
            "Upload finished: {} uploaded, {} too large, {} binary, {} failed, {} over the limit",
            summary.uploaded,
            summary.skipped_large,
            summary.skipped_binary,
            summary.failed,
            summary.skipped_at_limit
        ));

        if !has_descriptor {
            return Err(DeployerError::ValidationError(format!(
                "{} was not uploaded; a Docker Space cannot build without it",
                BUILD_DESCRIPTOR
            )));
        }

        if !has_manifest {
            self.upload_manifest(job, spaces, space_id, request).await;
        }

        job.progress(PROGRESS_UPLOAD_END);
        Ok(summary)
    }

    /// Synthesize and upload a manifest; failure is logged only
    async fn upload_manifest(
        &self,
        job: &JobHandle,
        spaces: &dyn SpaceHost,
        space_id: &str,
        request: &DeploymentRequest,
    ) {
        job.log(format!("No {} in repository, generating one", MANIFEST_FILE));

        let full_name = format!("{}/{}", request.coordinates.owner, request.coordinates.repo);
        let manifest = render_manifest(&ManifestInput {
            title: &request.config.space_name,
            description: request
                .config
                .description
                .as_deref()
                .or(request.repo_info.description.as_deref()),
            port: request.config.port,
            hardware: request.config.hardware,
            tags: &request.config.tags,
            repo_full_name: &full_name,
            repo_url: &request.repo_url,
            repo_name: &request.coordinates.repo,
        });

        match spaces.upload_file(space_id, MANIFEST_FILE, manifest.as_bytes()).await {
            Ok(()) => job.log(format!("Uploaded generated {}", MANIFEST_FILE)),
            Err(e) => {
                warn!(deployment_id = %job.id(), "Could not upload manifest: {}", e);
                job.log(format!("Failed to upload generated {}: {}", MANIFEST_FILE, e));
            }
        }
    }

    /// Poll the build until it runs, fails, or attempts run out
    async fn await_build(
        &self,
        job: &JobHandle,
        spaces: &dyn SpaceHost,
        space_id: &str,
    ) -> Result<(), DeployerError> {
        let max_attempts = self.settings.build_max_attempts;
        job.log(format!(
            "Waiting {}s before checking the build",
            self.settings.build_initial_delay.as_secs()
        ));
        tokio::time::sleep(self.settings.build_initial_delay).await;

        let mut started = false;
        let mut last_status = String::from("unknown");
        let mut answered = false;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match spaces.get_space_status(space_id).await {
                Ok(handle) => {
                    answered = true;
                    job.log(format!(
                        "Build status ({}/{}): {}",
                        attempt, max_attempts, handle.raw_status
                    ));
                    match classify(&handle.status) {
                        BuildStatus::Failed => {
                            return Err(DeployerError::BuildFailed(format!(
                                "Space reported status {}",
                                handle.raw_status
                            )));
                        }
                        BuildStatus::Running => {
                            job.log("Space is running");
                            return Ok(());
                        }
                        BuildStatus::InProgress => started = true,
                        BuildStatus::Unknown => {}
                    }
                    last_status = handle.raw_status;
                }
                Err(e) => {
                    warn!(deployment_id = %job.id(), "Status check {} failed: {}", attempt, e);
                    job.log(format!("Status check {}/{} failed: {}", attempt, max_attempts, e));
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.settings.build_poll_interval).await;
            }
        }

        // The build state is unknown if the Hub never answered
        if !answered {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        if started {
            Err(DeployerError::BuildTimedOut(format!(
                "still {} after {} status checks",
                last_status, max_attempts
            )))
        } else {
            Err(DeployerError::BuildNeverStarted(format!(
                "no build activity reported after {} status checks",
                max_attempts
            )))
        }
    }
}

/// Progress between upload start and end after `done` of `total` entries
pub fn upload_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_UPLOAD_END;
    }
    let span = (PROGRESS_UPLOAD_END - PROGRESS_UPLOAD_START) as usize;
    PROGRESS_UPLOAD_START + (span * done.min(total) / total) as u8
}
