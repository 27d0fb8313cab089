//! Build status classification
//!
//! The Hub reports a free-text runtime stage (`BUILDING`, `RUNNING`,
//! `BUILD_ERROR`, ...). The vocabulary is not a stable contract, so the
//! mapping is a keyword search over the lower-cased text. This is a
//! heuristic; keep the tables in sync with what the Hub actually returns.

/// Any of these marks the build as failed. Checked before [`RUNNING_KEYWORDS`].
pub const FAILURE_KEYWORDS: [&str; 3] = ["error", "failed", "no_app_file"];

pub const RUNNING_KEYWORDS: [&str; 1] = ["running"];

/// Text the Hub reports before a build has been scheduled
pub const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Nothing reported yet
    Unknown,
    InProgress,
    Running,
    Failed,
}

pub fn classify(status: &str) -> BuildStatus {
    let status = status.trim().to_lowercase();
    if status.is_empty() || status == UNKNOWN_STATUS {
        BuildStatus::Unknown
    } else if FAILURE_KEYWORDS.iter().any(|k| status.contains(k)) {
        BuildStatus::Failed
    } else if RUNNING_KEYWORDS.iter().any(|k| status.contains(k)) {
        BuildStatus::Running
    } else {
        BuildStatus::InProgress
    }
}
