//! Project family detection and the configuration each family needs on a Space

use std::collections::BTreeMap;

use serde::Serialize;

use api_models::{Hardware, RepositoryInfo};

use crate::github::inspector::BuildArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    OpenWebUi,
    Gradio,
    Streamlit,
    Python,
    Node,
    Docker,
}

impl ProjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectKind::OpenWebUi => "Open WebUI",
            ProjectKind::Gradio => "Gradio App",
            ProjectKind::Streamlit => "Streamlit App",
            ProjectKind::Python => "FastAPI/Python App",
            ProjectKind::Node => "Node.js App",
            ProjectKind::Docker => "Docker App",
        }
    }
}

/// Recommended Space configuration for a detected project family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProfile {
    pub kind: ProjectKind,
    pub project_type: String,
    pub recommended_env_vars: BTreeMap<String, String>,
    pub warnings: Vec<String>,
    pub hardware_recommendation: Hardware,
}

/// Open WebUI matches on the repository name alone
pub fn is_open_webui(repo_name: &str) -> bool {
    let name = repo_name.to_lowercase();
    name.contains("open-webui") || name.contains("openwebui")
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Runtime keys an Open WebUI Space must be given, with placeholder values
pub fn open_webui_env_vars() -> BTreeMap<String, String> {
    vars(&[
        ("WEBUI_SECRET_KEY", "your-secret-key-here"),
        ("ADMIN_USER_EMAIL", "admin@example.com"),
        ("ADMIN_USER_PASSWORD", "your-admin-password"),
        ("SPACE_ID", "your-space-id"),
        ("PORT", "8080"),
        ("HOST", "0.0.0.0"),
        ("ENV", "prod"),
        ("SCARF_NO_ANALYTICS", "true"),
        ("DO_NOT_TRACK", "true"),
        ("ANONYMIZED_TELEMETRY", "false"),
        ("OPENAI_API_KEY", "sk-your-openai-api-key (optional)"),
        ("OLLAMA_BASE_URL", "https://your-ollama-server.com (optional)"),
    ])
}

pub fn open_webui_warnings() -> Vec<String> {
    [
        "ADMIN_USER_EMAIL and ADMIN_USER_PASSWORD must be set to create the admin account",
        "SPACE_ID must be set to the Space id (format: username/space-name)",
        "WEBUI_SECRET_KEY must be set to a strong random string",
        "An external LLM service (OpenAI API or an Ollama server) is required",
        "The first start can take several minutes while models download",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

/// Classify a repository from its name, description and primary language
pub fn detect_project_type(repo: &RepositoryInfo, artifact: &BuildArtifact) -> ProjectProfile {
    let name = repo.name.to_lowercase();
    let description = repo.description.as_deref().unwrap_or_default().to_lowercase();
    let language = repo.language.as_deref().unwrap_or_default().to_lowercase();
    let mentions = |word: &str| name.contains(word) || description.contains(word);

    let (kind, recommended_env_vars, warnings, hardware) = if is_open_webui(&repo.name) {
        (
            ProjectKind::OpenWebUi,
            open_webui_env_vars(),
            open_webui_warnings(),
            Hardware::CpuUpgrade,
        )
    } else if mentions("gradio") {
        (
            ProjectKind::Gradio,
            vars(&[("GRADIO_SERVER_NAME", "0.0.0.0"), ("GRADIO_SERVER_PORT", "7860")]),
            Vec::new(),
            Hardware::CpuBasic,
        )
    } else if mentions("streamlit") {
        (
            ProjectKind::Streamlit,
            vars(&[("STREAMLIT_SERVER_PORT", "8501"), ("STREAMLIT_SERVER_ADDRESS", "0.0.0.0")]),
            Vec::new(),
            Hardware::CpuBasic,
        )
    } else if mentions("fastapi") || language == "python" {
        (
            ProjectKind::Python,
            vars(&[("PORT", "8000"), ("HOST", "0.0.0.0")]),
            Vec::new(),
            Hardware::CpuBasic,
        )
    } else if language == "javascript" || language == "typescript" {
        (
            ProjectKind::Node,
            vars(&[("PORT", "3000"), ("NODE_ENV", "production")]),
            Vec::new(),
            Hardware::CpuBasic,
        )
    } else {
        let port = artifact
            .exposed_ports
            .first()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "8080".to_string());
        (
            ProjectKind::Docker,
            vars(&[("PORT", port.as_str())]),
            Vec::new(),
            Hardware::CpuBasic,
        )
    };

    ProjectProfile {
        kind,
        project_type: kind.label().to_string(),
        recommended_env_vars,
        warnings,
        hardware_recommendation: hardware,
    }
}
