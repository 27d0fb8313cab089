//! Deployment job record and its mutation handle

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use api_models::{DeploymentConfig, RepositoryInfo};

use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentStage};
use crate::store::JobStore;
use crate::utils::RepoCoordinates;

/// Progress reported while validating
pub const PROGRESS_VALIDATING: u8 = 10;
pub const PROGRESS_CREATING: u8 = 25;
pub const PROGRESS_UPLOAD_START: u8 = 40;
pub const PROGRESS_UPLOAD_END: u8 = 60;
pub const PROGRESS_BUILDING: u8 = 75;
pub const PROGRESS_COMPLETED: u8 = 100;

/// Everything needed to run (or re-run) a deployment
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub coordinates: RepoCoordinates,
    pub repo_url: String,
    pub repo_info: RepositoryInfo,
    pub config: DeploymentConfig,
}

/// Outcome counters of the upload loop
///
/// Every listed entry lands in exactly one bucket, so
/// `uploaded + skipped_large + skipped_binary + skipped_at_limit + failed == total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub total: usize,
    pub uploaded: usize,
    pub skipped_large: usize,
    pub skipped_binary: usize,
    pub skipped_at_limit: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn accounted(&self) -> usize {
        self.uploaded + self.skipped_large + self.skipped_binary + self.skipped_at_limit + self.failed
    }
}

/// Status record of one deployment, as served to pollers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentJob {
    pub deployment_id: String,
    #[serde(flatten)]
    pub fsm: DeploymentFsm,
    pub progress: u8,
    pub message: String,
    pub logs: Vec<String>,
    pub space_url: Option<String>,
    pub summary: UploadSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub request: Option<Arc<DeploymentRequest>>,
}

impl DeploymentJob {
    pub fn new(deployment_id: &str, request: Option<Arc<DeploymentRequest>>) -> Self {
        let now = Utc::now();
        Self {
            deployment_id: deployment_id.to_string(),
            fsm: DeploymentFsm::new(),
            progress: PROGRESS_VALIDATING,
            message: "Validating configuration...".to_string(),
            logs: Vec::new(),
            space_url: None,
            summary: UploadSummary::default(),
            created_at: now,
            updated_at: now,
            request,
        }
    }

    pub fn stage(&self) -> DeploymentStage {
        self.fsm.stage()
    }

    pub fn error(&self) -> Option<&str> {
        self.fsm.error()
    }

    /// Put the record back to its initial state for another run
    pub fn reset_for_retry(&mut self) -> Result<(), String> {
        if !self.fsm.can_retry() {
            return Err(format!(
                "only failed deployments can be retried, this one is {}",
                self.stage().as_str()
            ));
        }
        self.fsm.process(DeploymentEvent::Retry)?;
        self.progress = PROGRESS_VALIDATING;
        self.message = "Validating configuration...".to_string();
        self.logs.clear();
        self.space_url = None;
        self.summary = UploadSummary::default();
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// `[HH:MM:SS] text`, UTC
pub fn format_log_line(at: DateTime<Utc>, text: &str) -> String {
    format!("[{}] {}", at.format("%H:%M:%S"), text)
}

/// Write access to one job record in the store
#[derive(Clone)]
pub struct JobHandle {
    id: String,
    store: Arc<dyn JobStore>,
}

impl JobHandle {
    pub fn new(id: &str, store: Arc<dyn JobStore>) -> Self {
        Self {
            id: id.to_string(),
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current snapshot of the record
    pub fn snapshot(&self) -> Option<DeploymentJob> {
        self.store.get(&self.id)
    }

    /// Apply a change to the record and bump `updated_at`
    pub fn update<F>(&self, mut apply: F)
    where
        F: FnMut(&mut DeploymentJob),
    {
        let found = self.store.update(&self.id, &mut |job: &mut DeploymentJob| {
            apply(job);
            job.updated_at = Utc::now();
        });
        if !found {
            warn!(deployment_id = %self.id, "Job record disappeared from the store");
        }
    }

    /// Append a timestamped line to the job log
    pub fn log(&self, text: impl Into<String>) {
        let text = text.into();
        info!(deployment_id = %self.id, "{}", text);
        let line = format_log_line(Utc::now(), &text);
        self.update(|job| job.logs.push(line.clone()));
    }

    /// Raise progress; lower values are ignored
    pub fn progress(&self, value: u8) {
        self.update(|job| job.progress = job.progress.max(value.min(PROGRESS_COMPLETED)));
    }

    /// Move to the next stage with a new message and progress floor
    pub fn transition(&self, event: DeploymentEvent, progress: u8, message: &str) {
        self.update(|job| {
            if let Err(e) = job.fsm.process(event.clone()) {
                warn!(deployment_id = %job.deployment_id, "{}", e);
                return;
            }
            job.progress = job.progress.max(progress);
            job.message = message.to_string();
        });
    }

    pub fn record_summary(&self, summary: &UploadSummary) {
        self.update(|job| job.summary = summary.clone());
    }

    /// Terminal failure: progress drops to 0
    pub fn fail(&self, error: &str) {
        let line = format_log_line(Utc::now(), &format!("Error: {}", error));
        self.update(|job| {
            if let Err(e) = job.fsm.process(DeploymentEvent::Failed(error.to_string())) {
                warn!(deployment_id = %job.deployment_id, "{}", e);
                return;
            }
            job.progress = 0;
            job.message = "Deployment failed".to_string();
            job.logs.push(line.clone());
        });
    }

    pub fn complete(&self, space_url: &str) {
        self.update(|job| {
            if let Err(e) = job.fsm.process(DeploymentEvent::BuildReady) {
                warn!(deployment_id = %job.deployment_id, "{}", e);
                return;
            }
            job.progress = PROGRESS_COMPLETED;
            job.message = "Deployment completed".to_string();
            job.space_url = Some(space_url.to_string());
        });
        self.log(format!("Deployment succeeded, Space available at {}", space_url));
    }
}
