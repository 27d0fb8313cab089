//! Settings loaded from the process environment

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::DeployerError;
use crate::logs::LogLevel;

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const HUGGINGFACE_TOKEN_VAR: &str = "HUGGINGFACE_TOKEN";
pub const HUGGINGFACE_USERNAME_VAR: &str = "HUGGINGFACE_USERNAME";

/// Variables that must be present for deployments and health checks
pub const REQUIRED_VARS: [&str; 3] = [
    GITHUB_TOKEN_VAR,
    HUGGINGFACE_TOKEN_VAR,
    HUGGINGFACE_USERNAME_VAR,
];

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Credentials for both remote hosts. Every field is optional here; absence
/// is reported by the orchestrator's validating stage, not at start-up.
#[derive(Debug, Default)]
pub struct Credentials {
    pub github_token: Option<SecretString>,
    pub hf_token: Option<SecretString>,
    pub hf_username: Option<String>,
}

impl Credentials {
    /// Names of the required variables that are not set
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.github_token.is_none() {
            missing.push(GITHUB_TOKEN_VAR);
        }
        if self.hf_token.is_none() {
            missing.push(HUGGINGFACE_TOKEN_VAR);
        }
        if self.hf_username.is_none() {
            missing.push(HUGGINGFACE_USERNAME_VAR);
        }
        missing
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_ref().map(|t| t.expose_secret())
    }

    pub fn hf_token(&self) -> Option<&str> {
        self.hf_token.as_ref().map(|t| t.expose_secret())
    }
}

/// Deployer settings
#[derive(Debug)]
pub struct Settings {
    pub credentials: Arc<Credentials>,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Hugging Face Hub base URL
    pub hub_url: String,

    pub host: String,
    pub port: u16,

    pub log_level: LogLevel,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,

    /// Deployments allowed to run at the same time
    pub max_concurrent_deployments: usize,

    /// How long finished jobs stay queryable
    pub job_retention: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: Arc::new(Credentials::default()),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: LogLevel::Info,
            log_json: false,
            log_dir: None,
            max_concurrent_deployments: 4,
            job_retention: Duration::from_secs(3600),
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, DeployerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeployerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        let credentials = Arc::new(Credentials {
            github_token: get(GITHUB_TOKEN_VAR).map(SecretString::from),
            hf_token: get(HUGGINGFACE_TOKEN_VAR).map(SecretString::from),
            hf_username: get(HUGGINGFACE_USERNAME_VAR),
        });

        let port = match get("GH2HF_PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| DeployerError::ConfigError(format!("Invalid GH2HF_PORT: {}", v)))?,
            None => defaults.port,
        };

        let log_level = match get("GH2HF_LOG_LEVEL") {
            Some(v) => v.parse().map_err(DeployerError::ConfigError)?,
            None => defaults.log_level,
        };

        let max_concurrent_deployments = match get("GH2HF_MAX_CONCURRENT_DEPLOYMENTS") {
            Some(v) => v.parse().ok().filter(|n: &usize| *n > 0).ok_or_else(|| {
                DeployerError::ConfigError(format!(
                    "Invalid GH2HF_MAX_CONCURRENT_DEPLOYMENTS: {}",
                    v
                ))
            })?,
            None => defaults.max_concurrent_deployments,
        };

        let job_retention = match get("GH2HF_JOB_RETENTION_SECS") {
            Some(v) => Duration::from_secs(v.parse().map_err(|_| {
                DeployerError::ConfigError(format!("Invalid GH2HF_JOB_RETENTION_SECS: {}", v))
            })?),
            None => defaults.job_retention,
        };

        Ok(Self {
            credentials,
            github_api_url: get("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            hub_url: get("HF_ENDPOINT").unwrap_or(defaults.hub_url),
            host: get("GH2HF_HOST").unwrap_or(defaults.host),
            port,
            log_level,
            log_json: get("GH2HF_LOG_JSON")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
            log_dir: get("GH2HF_LOG_DIR").map(PathBuf::from),
            max_concurrent_deployments,
            job_retention,
        })
    }
}
