//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::config::Settings;
use crate::errors::DeployerError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::sweeper;

/// Run the deployer service until `shutdown_signal` resolves
pub async fn run(
    settings: Arc<Settings>,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeployerError> {
    info!("Initializing GH2HF deployer...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(settings, &options, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start deployer: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    settings: Arc<Settings>,
    options: &AppOptions,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), DeployerError> {
    let missing = settings.credentials.missing();
    if !missing.is_empty() {
        error!(
            "Missing environment variables: {}; deployments will fail validation",
            missing.join(", ")
        );
    }

    let app_state = Arc::new(AppState::init(settings, options)?);
    shutdown_manager.with_app_state(app_state.clone())?;

    init_sweeper_worker(
        options.sweeper.clone(),
        app_state.clone(),
        shutdown_manager,
        shutdown_tx.subscribe(),
    )?;

    init_socket_server(options, app_state, shutdown_manager, shutdown_tx.subscribe()).await
}

fn init_sweeper_worker(
    options: sweeper::Options,
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DeployerError> {
    info!("Initializing sweeper worker...");

    let store = app_state.store.clone();
    let sweeper_handle = tokio::spawn(async move {
        sweeper::run(
            &options,
            store,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_sweeper_worker_handle(sweeper_handle)
}

async fn init_socket_server(
    options: &AppOptions,
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DeployerError> {
    info!("Initializing local HTTP server...");

    let server_state = ServerState::new(
        app_state.settings.clone(),
        app_state.connector.clone(),
        app_state.store.clone(),
        app_state.runner.clone(),
    );

    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_socket_server_handle(server_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    app_state: Option<Arc<AppState>>,
    socket_server_handle: Option<JoinHandle<Result<(), DeployerError>>>,
    sweeper_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            app_state: None,
            socket_server_handle: None,
            sweeper_worker_handle: None,
        }
    }

    pub fn with_app_state(&mut self, state: Arc<AppState>) -> Result<(), DeployerError> {
        if self.app_state.is_some() {
            return Err(DeployerError::ShutdownError("app_state already set".to_string()));
        }
        self.app_state = Some(state);
        Ok(())
    }

    pub fn with_sweeper_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), DeployerError> {
        if self.sweeper_worker_handle.is_some() {
            return Err(DeployerError::ShutdownError("sweeper_handle already set".to_string()));
        }
        self.sweeper_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), DeployerError>>,
    ) -> Result<(), DeployerError> {
        if self.socket_server_handle.is_some() {
            return Err(DeployerError::ShutdownError("server_handle already set".to_string()));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), DeployerError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), DeployerError> {
        info!("Shutting down GH2HF deployer...");

        // 1. Sweeper worker
        if let Some(handle) = self.sweeper_worker_handle.take() {
            handle
                .await
                .map_err(|e| DeployerError::ShutdownError(e.to_string()))?;
        }

        // 2. Socket server
        if let Some(handle) = self.socket_server_handle.take() {
            handle
                .await
                .map_err(|e| DeployerError::ShutdownError(e.to_string()))??;
        }

        // 3. App state; running deployments are abandoned with the process
        if let Some(app_state) = self.app_state.take() {
            app_state.shutdown();
        }

        info!("Shutdown complete");
        Ok(())
    }
}
