//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::config::Settings;
use crate::deploy::orchestrator::Orchestrator;
use crate::deploy::runner::DeploymentRunner;
use crate::errors::DeployerError;
use crate::remote::{HttpConnector, RemoteConnector};
use crate::store::{InMemoryJobStore, JobStore};

/// Main application state
pub struct AppState {
    pub settings: Arc<Settings>,

    /// Factory for GitHub and Hub clients
    pub connector: Arc<dyn RemoteConnector>,

    /// Deployment status records
    pub store: Arc<dyn JobStore>,

    pub runner: DeploymentRunner,
}

impl AppState {
    /// Initialize application state against the real remote hosts
    pub fn init(settings: Arc<Settings>, options: &AppOptions) -> Result<Self, DeployerError> {
        let connector: Arc<dyn RemoteConnector> = Arc::new(HttpConnector::new(&settings)?);
        Ok(Self::with_connector(settings, options, connector))
    }

    /// Initialize application state with a given connector
    pub fn with_connector(
        settings: Arc<Settings>,
        options: &AppOptions,
        connector: Arc<dyn RemoteConnector>,
    ) -> Self {
        info!("Initializing application state...");

        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let orchestrator = Arc::new(Orchestrator::new(
            options.orchestrator.clone(),
            settings.credentials.clone(),
            connector.clone(),
        ));
        let runner = DeploymentRunner::new(
            orchestrator,
            store.clone(),
            options.max_concurrent_deployments,
        );

        Self {
            settings,
            connector,
            store,
            runner,
        }
    }

    /// Shutdown application state
    pub fn shutdown(&self) {
        info!(
            "Shutting down application state ({} deployment records dropped)",
            self.store.len()
        );
        self.runner.close();
    }
}
