//! Job store unit tests

use std::time::Duration;

use chrono::Utc;

use gh2hf::deploy::fsm::DeploymentEvent;
use gh2hf::deploy::job::DeploymentJob;
use gh2hf::store::{InMemoryJobStore, JobStore};

fn finished_job(id: &str, minutes_ago: i64) -> DeploymentJob {
    let mut job = DeploymentJob::new(id, None);
    job.fsm
        .process(DeploymentEvent::Failed("boom".to_string()))
        .unwrap();
    job.updated_at = Utc::now() - chrono::Duration::minutes(minutes_ago);
    job
}

#[test]
fn test_store_set_and_get() {
    let store = InMemoryJobStore::new();
    store.set(DeploymentJob::new("deploy_1", None));

    let job = store.get("deploy_1");
    assert!(job.is_some());
    assert_eq!(job.unwrap().progress, 10);
    assert!(store.get("deploy_2").is_none());
}

#[test]
fn test_store_update_replaces_record() {
    let store = InMemoryJobStore::new();
    store.set(DeploymentJob::new("deploy_1", None));

    let found = store.update("deploy_1", &mut |job: &mut DeploymentJob| {
        job.logs.push("[00:00:00] hello".to_string());
        job.progress = 25;
    });
    assert!(found);

    let job = store.get("deploy_1").unwrap();
    assert_eq!(job.logs.len(), 1);
    assert_eq!(job.progress, 25);

    assert!(!store.update("missing", &mut |_job: &mut DeploymentJob| {}));
}

#[test]
fn test_store_delete() {
    let store = InMemoryJobStore::new();
    store.set(DeploymentJob::new("deploy_1", None));

    assert!(store.delete("deploy_1").is_some());
    assert!(store.get("deploy_1").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_store_evicts_only_expired_terminal_jobs() {
    let store = InMemoryJobStore::new();
    store.set(finished_job("old_failed", 120));
    store.set(finished_job("recent_failed", 5));

    let mut running = DeploymentJob::new("old_running", None);
    running.updated_at = Utc::now() - chrono::Duration::minutes(120);
    store.set(running);

    let evicted = store.evict_expired(Utc::now(), Duration::from_secs(3600));
    assert_eq!(evicted, 1);
    assert!(store.get("old_failed").is_none());
    assert!(store.get("recent_failed").is_some());
    assert!(store.get("old_running").is_some());
    assert_eq!(store.len(), 2);
}
