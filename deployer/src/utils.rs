//! Utility functions

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static GITHUB_URL_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)$").unwrap(),
        Regex::new(r"^git@github\.com:([^/]+)/([^/]+)$").unwrap(),
        Regex::new(r"^([^/:\s]+)/([^/\s]+)$").unwrap(),
    ]
});

static SPACE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Version information for the deployer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Generate a deployment id: creation time plus a random suffix
pub fn generate_deployment_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("deploy_{}_{}", millis, &random[..9])
}

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

/// Parse `https://github.com/o/r`, `git@github.com:o/r` or `o/r`
pub fn parse_github_url(url: &str) -> Option<RepoCoordinates> {
    let trimmed = url.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    GITHUB_URL_PATTERNS.iter().find_map(|pattern| {
        pattern.captures(trimmed).map(|caps| RepoCoordinates {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
        })
    })
}

/// Space names are lowercase alphanumerics and hyphens, 2 to 96 characters
pub fn validate_space_name(name: &str) -> bool {
    SPACE_NAME_RE.is_match(name) && (2..=96).contains(&name.len())
}

/// Human readable byte size
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}
