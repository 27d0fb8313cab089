//! Application configuration options

use std::time::Duration;

use crate::config::Settings;
use crate::deploy::orchestrator::OrchestratorSettings;
use crate::workers::sweeper;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Orchestrator limits and timings
    pub orchestrator: OrchestratorSettings,

    /// Deployments allowed to run at the same time
    pub max_concurrent_deployments: usize,

    /// Sweeper worker options
    pub sweeper: sweeper::Options,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions::default(),
            orchestrator: OrchestratorSettings::default(),
            max_concurrent_deployments: 4,
            sweeper: sweeper::Options::default(),
        }
    }
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            server: ServerOptions {
                host: settings.host.clone(),
                port: settings.port,
            },
            max_concurrent_deployments: settings.max_concurrent_deployments,
            sweeper: sweeper::Options {
                retention: settings.job_retention,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}
