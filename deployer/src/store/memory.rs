//! In-process job store

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::deploy::job::DeploymentJob;
use crate::store::JobStore;

/// Job records held in process memory; lost on restart
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, DeploymentJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_expired(job: &DeploymentJob, now: DateTime<Utc>, retention: Duration) -> bool {
    job.stage().is_terminal()
        && (now - job.updated_at)
            .to_std()
            .map(|age| age >= retention)
            .unwrap_or(false)
}

impl JobStore for InMemoryJobStore {
    fn get(&self, id: &str) -> Option<DeploymentJob> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).cloned()
    }

    fn set(&self, job: DeploymentJob) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.deployment_id.clone(), job);
    }

    fn delete(&self, id: &str) -> Option<DeploymentJob> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.remove(id)
    }

    fn update(&self, id: &str, apply: &mut dyn FnMut(&mut DeploymentJob)) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let Some(current) = jobs.get(id) else {
            return false;
        };

        let mut next = current.clone();
        apply(&mut next);
        jobs.insert(id.to_string(), next);
        true
    }

    fn evict_expired(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let before = jobs.len();
        jobs.retain(|_, job| !is_expired(job, now, retention));
        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!("Evicted {} expired deployment records", evicted);
        }
        evicted
    }

    fn len(&self) -> usize {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.len()
    }
}
