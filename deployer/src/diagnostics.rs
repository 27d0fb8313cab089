//! Configuration health checks

use api_models::{CheckResult, HealthChecks, HealthReport};
use tracing::debug;

use crate::config::Credentials;
use crate::remote::RemoteConnector;

const HF_TOKEN_PREFIX: &str = "hf_";

/// Run the environment, GitHub and Hub checks
pub async fn run_checks(credentials: &Credentials, connector: &dyn RemoteConnector) -> HealthReport {
    let checks = HealthChecks {
        environment: check_environment(credentials),
        github: check_github(credentials, connector).await,
        huggingface: check_huggingface(credentials, connector).await,
    };
    debug!("Health checks finished: {:?}", checks);
    HealthReport::from_checks(checks)
}

fn check_environment(credentials: &Credentials) -> CheckResult {
    let missing = credentials.missing();
    if missing.is_empty() {
        CheckResult::success("All required environment variables are set")
    } else {
        CheckResult::error(format!("Missing environment variables: {}", missing.join(", ")))
    }
}

async fn check_github(credentials: &Credentials, connector: &dyn RemoteConnector) -> CheckResult {
    let Some(token) = credentials.github_token() else {
        return CheckResult::error("GITHUB_TOKEN is not set");
    };

    let result = match connector.source(Some(token)) {
        Ok(source) => source.authenticated_user().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(login) => CheckResult::success(format!("GitHub API reachable (user: {})", login)),
        Err(e) => CheckResult::error(format!("GitHub API check failed: {}", e)),
    }
}

async fn check_huggingface(credentials: &Credentials, connector: &dyn RemoteConnector) -> CheckResult {
    let Some(token) = credentials.hf_token() else {
        return CheckResult::error("HUGGINGFACE_TOKEN is not set");
    };
    let Some(username) = credentials.hf_username.as_deref() else {
        return CheckResult::error("HUGGINGFACE_USERNAME is not set");
    };
    if !token.starts_with(HF_TOKEN_PREFIX) {
        return CheckResult::error("HUGGINGFACE_TOKEN has an invalid format");
    }

    let result = match connector.spaces(token, username) {
        Ok(spaces) => spaces.whoami().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(name) => CheckResult::success(format!(
            "Hugging Face token valid (user: {}, namespace: {})",
            name, username
        )),
        Err(e) => CheckResult::error(format!("Hugging Face check failed: {}", e)),
    }
}
