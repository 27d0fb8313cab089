//! Deployment status store

pub mod memory;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::deploy::job::DeploymentJob;

pub use memory::InMemoryJobStore;

/// Keyed storage of deployment records.
///
/// Each job has a single writer (its orchestrator task). `update` is a
/// read-modify-write of one key that replaces the whole record, so readers
/// see either the old or the new version.
pub trait JobStore: Send + Sync {
    fn get(&self, id: &str) -> Option<DeploymentJob>;

    fn set(&self, job: DeploymentJob);

    fn delete(&self, id: &str) -> Option<DeploymentJob>;

    /// Returns `false` when no record exists under `id`
    fn update(&self, id: &str, apply: &mut dyn FnMut(&mut DeploymentJob)) -> bool;

    /// Drop terminal records last updated more than `retention` before `now`.
    /// Returns the number removed.
    fn evict_expired(&self, now: DateTime<Utc>, retention: Duration) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
