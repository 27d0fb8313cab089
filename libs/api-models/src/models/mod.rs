//! API models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// `?owner=&repo=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoQuery {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

/// `?deploymentId=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentQuery {
    pub deployment_id: Option<String>,
}

/// Repository owner summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Repository metadata returned by `/api/github/repo` and echoed back on deploy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub clone_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub private: bool,
    pub owner: OwnerInfo,
}

/// Space visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Space hardware flavor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hardware {
    #[default]
    #[serde(rename = "cpu-basic")]
    CpuBasic,
    #[serde(rename = "cpu-upgrade")]
    CpuUpgrade,
    #[serde(rename = "t4-small", alias = "gpu-t4")]
    GpuT4,
}

impl Hardware {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hardware::CpuBasic => "cpu-basic",
            Hardware::CpuUpgrade => "cpu-upgrade",
            Hardware::GpuT4 => "t4-small",
        }
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hardware {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu-basic" => Ok(Hardware::CpuBasic),
            "cpu-upgrade" => Ok(Hardware::CpuUpgrade),
            "gpu-t4" | "t4-small" => Ok(Hardware::GpuT4),
            _ => Err(format!("Invalid hardware: {}", s)),
        }
    }
}

/// Space SDK kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceSdk {
    #[default]
    Docker,
    Gradio,
    Streamlit,
    Static,
}

impl SpaceSdk {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceSdk::Docker => "docker",
            SpaceSdk::Gradio => "gradio",
            SpaceSdk::Streamlit => "streamlit",
            SpaceSdk::Static => "static",
        }
    }
}

/// Parameters collected by the wizard before deploying
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub space_name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Port the container listens on, written to the manifest as `app_port`
    #[serde(default)]
    pub port: Option<u16>,
}

/// `POST /api/huggingface/deploy`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub repo_url: Option<String>,
    pub repo_info: Option<RepositoryInfo>,
    pub deployment_config: Option<DeploymentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployAccepted {
    pub deployment_id: String,
}

/// `POST /api/huggingface/retry`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub deployment_id: Option<String>,
}

/// Outcome of a single health check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[default]
    Unknown,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthChecks {
    pub github: CheckResult,
    pub huggingface: CheckResult,
    pub environment: CheckResult,
}

impl HealthChecks {
    pub fn has_errors(&self) -> bool {
        [&self.github, &self.huggingface, &self.environment]
            .iter()
            .any(|check| check.status == CheckStatus::Error)
    }
}

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: CheckStatus,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
    pub message: String,
}

impl HealthReport {
    pub fn from_checks(checks: HealthChecks) -> Self {
        let has_errors = checks.has_errors();
        Self {
            status: if has_errors {
                CheckStatus::Error
            } else {
                CheckStatus::Success
            },
            timestamp: Utc::now(),
            checks,
            message: if has_errors {
                "Configuration checks found problems".to_string()
            } else {
                "All configuration checks passed".to_string()
            },
        }
    }
}
