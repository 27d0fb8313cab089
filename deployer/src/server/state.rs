//! Server state

use std::sync::Arc;

use crate::config::Settings;
use crate::deploy::runner::DeploymentRunner;
use crate::remote::RemoteConnector;
use crate::store::JobStore;

/// Server state shared across handlers
pub struct ServerState {
    pub settings: Arc<Settings>,
    pub connector: Arc<dyn RemoteConnector>,
    pub store: Arc<dyn JobStore>,
    pub runner: DeploymentRunner,
}

impl ServerState {
    pub fn new(
        settings: Arc<Settings>,
        connector: Arc<dyn RemoteConnector>,
        store: Arc<dyn JobStore>,
        runner: DeploymentRunner,
    ) -> Self {
        Self {
            settings,
            connector,
            store,
            runner,
        }
    }
}
