//! Bounded background runner for deployments
//!
//! Handlers submit a request and get back the job id only. Each job runs
//! in its own task; a semaphore caps how many run at once.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::deploy::job::{DeploymentJob, DeploymentRequest, JobHandle};
use crate::deploy::orchestrator::Orchestrator;
use crate::errors::DeployerError;
use crate::store::JobStore;
use crate::utils::generate_deployment_id;

#[derive(Clone)]
pub struct DeploymentRunner {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn JobStore>,
    permits: Arc<Semaphore>,
}

impl DeploymentRunner {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<dyn JobStore>, max_concurrent: usize) -> Self {
        Self {
            orchestrator,
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Record a new job and start it in the background
    pub fn submit(&self, request: DeploymentRequest) -> String {
        let id = generate_deployment_id();
        let request = Arc::new(request);
        self.store
            .set(DeploymentJob::new(&id, Some(request.clone())));
        info!(deployment_id = %id, "Accepted deployment of {}", request.repo_url);

        self.spawn(&id, request);
        id
    }

    /// Restart a failed job from the beginning
    ///
    /// The Space created by the failed run is left as is, so creating it
    /// again may fail remotely.
    pub fn retry(&self, id: &str) -> Result<(), DeployerError> {
        let mut outcome: Result<Option<Arc<DeploymentRequest>>, String> = Ok(None);
        let found = self.store.update(id, &mut |job: &mut DeploymentJob| {
            outcome = job.reset_for_retry().map(|()| job.request.clone());
        });

        if !found {
            return Err(DeployerError::NotFound(format!("Deployment {}", id)));
        }

        let request = outcome
            .map_err(|reason| DeployerError::Conflict(format!("Deployment {}: {}", id, reason)))?
            .ok_or_else(|| DeployerError::Internal(format!("Deployment {} has no request", id)))?;

        info!(deployment_id = %id, "Retrying deployment");
        self.spawn(id, request);
        Ok(())
    }

    fn spawn(&self, id: &str, request: Arc<DeploymentRequest>) {
        let job = JobHandle::new(id, self.store.clone());
        let orchestrator = self.orchestrator.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    job.fail(&format!("Deployment runner closed: {}", e));
                    return;
                }
            };
            debug!(deployment_id = %job.id(), "Deployment task started");
            orchestrator.run(&job, &request).await;
        });
    }

    /// Stop accepting permits; queued jobs fail
    pub fn close(&self) {
        self.permits.close();
    }
}
