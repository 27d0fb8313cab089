//! Finite State Machine for Space deployment

use serde::{Deserialize, Serialize};

/// Deployment stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStage {
    /// Checking credentials
    #[default]
    Validating,

    /// Creating the Space
    Creating,

    /// Copying repository files into the Space
    Uploading,

    /// Waiting for the Space build
    Building,

    /// Space is running
    Completed,

    /// Deployment failed
    Error,
}

impl DeploymentStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStage::Completed | DeploymentStage::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStage::Validating => "validating",
            DeploymentStage::Creating => "creating",
            DeploymentStage::Uploading => "uploading",
            DeploymentStage::Building => "building",
            DeploymentStage::Completed => "completed",
            DeploymentStage::Error => "error",
        }
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Credentials present
    Validated,

    /// Space exists remotely
    SpaceCreated,

    /// Upload loop finished with a build descriptor in place
    FilesUploaded,

    /// Build reported running
    BuildReady,

    /// Fatal failure at any stage
    Failed(String),

    /// Restart from the beginning
    Retry,
}

/// Deployment FSM
///
/// Transitions only move forward. `Failed` is accepted from every
/// non-terminal stage; `Retry` is the only way out of `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFsm {
    stage: DeploymentStage,
    error: Option<String>,
    attempt: u32,
}

impl DeploymentFsm {
    /// Create a new FSM in validating stage
    pub fn new() -> Self {
        Self {
            stage: DeploymentStage::Validating,
            error: None,
            attempt: 1,
        }
    }

    /// Get current stage
    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Runs of this deployment so far, starting at 1
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Process an event and transition stage
    pub fn process(&mut self, event: DeploymentEvent) -> Result<(), String> {
        let new_stage = match (&self.stage, &event) {
            (DeploymentStage::Validating, DeploymentEvent::Validated) => DeploymentStage::Creating,
            (DeploymentStage::Creating, DeploymentEvent::SpaceCreated) => DeploymentStage::Uploading,
            (DeploymentStage::Uploading, DeploymentEvent::FilesUploaded) => {
                DeploymentStage::Building
            }
            (DeploymentStage::Building, DeploymentEvent::BuildReady) => DeploymentStage::Completed,

            (stage, DeploymentEvent::Failed(err)) if !stage.is_terminal() => {
                self.error = Some(err.clone());
                DeploymentStage::Error
            }

            (DeploymentStage::Error, DeploymentEvent::Retry) => {
                self.error = None;
                self.attempt += 1;
                DeploymentStage::Validating
            }

            // Invalid transitions
            (stage, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", stage, event));
            }
        };

        self.stage = new_stage;
        Ok(())
    }

    /// Check if deployment can be retried
    pub fn can_retry(&self) -> bool {
        self.stage == DeploymentStage::Error
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
