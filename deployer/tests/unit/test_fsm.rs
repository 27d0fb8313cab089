//! FSM unit tests

use gh2hf::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentStage};

#[test]
fn test_fsm_initial_state() {
    let fsm = DeploymentFsm::new();
    assert_eq!(fsm.stage(), DeploymentStage::Validating);
    assert!(fsm.error().is_none());
    assert_eq!(fsm.attempt(), 1);
}

#[test]
fn test_fsm_deploy_success_flow() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Validated).unwrap();
    fsm.process(DeploymentEvent::SpaceCreated).unwrap();
    fsm.process(DeploymentEvent::FilesUploaded).unwrap();
    assert_eq!(fsm.stage(), DeploymentStage::Building);

    fsm.process(DeploymentEvent::BuildReady).unwrap();
    assert_eq!(fsm.stage(), DeploymentStage::Completed);
}

#[test]
fn test_fsm_failure_from_any_active_stage() {
    for steps in 0..4 {
        let mut fsm = DeploymentFsm::new();
        let forward = [
            DeploymentEvent::Validated,
            DeploymentEvent::SpaceCreated,
            DeploymentEvent::FilesUploaded,
        ];
        for event in forward.into_iter().take(steps) {
            fsm.process(event).unwrap();
        }

        fsm.process(DeploymentEvent::Failed("test error".to_string()))
            .unwrap();
        assert_eq!(fsm.stage(), DeploymentStage::Error);
        assert_eq!(fsm.error(), Some("test error"));
    }
}

#[test]
fn test_fsm_retry_after_failure() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Failed("error 1".to_string()))
        .unwrap();
    fsm.process(DeploymentEvent::Retry).unwrap();
    assert_eq!(fsm.stage(), DeploymentStage::Validating);
    assert!(fsm.error().is_none());
    assert_eq!(fsm.attempt(), 2);

    fsm.process(DeploymentEvent::Failed("error 2".to_string()))
        .unwrap();
    fsm.process(DeploymentEvent::Retry).unwrap();
    assert_eq!(fsm.attempt(), 3);
}

#[test]
fn test_fsm_invalid_transition() {
    let mut fsm = DeploymentFsm::new();

    // Cannot skip creation
    assert!(fsm.process(DeploymentEvent::FilesUploaded).is_err());

    // Cannot retry a job that has not failed
    assert!(fsm.process(DeploymentEvent::Retry).is_err());

    // Terminal stages are final
    fsm.process(DeploymentEvent::Validated).unwrap();
    fsm.process(DeploymentEvent::SpaceCreated).unwrap();
    fsm.process(DeploymentEvent::FilesUploaded).unwrap();
    fsm.process(DeploymentEvent::BuildReady).unwrap();
    assert!(fsm
        .process(DeploymentEvent::Failed("late".to_string()))
        .is_err());
    assert!(fsm.process(DeploymentEvent::Retry).is_err());
}
