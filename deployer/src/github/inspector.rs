//! Build-artifact detection for a repository's root directory

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::DeployerError;
use crate::github::profile::{detect_project_type, ProjectProfile};
use crate::github::SourceHost;

/// Container build descriptor looked up at the repository root
pub const BUILD_DESCRIPTOR: &str = "Dockerfile";

/// Compose descriptor names, checked in order
pub const COMPOSE_CANDIDATES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

static FROM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^\s*FROM\s+(.+)$").unwrap());
static WORKDIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*WORKDIR\s+(.+)$").unwrap());
static ENTRYPOINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*ENTRYPOINT\s+(.+)$").unwrap());
static CMD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^\s*CMD\s+(.+)$").unwrap());
static EXPOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*EXPOSE\s+(.+)$").unwrap());
static ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*ENV\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*=\s*|\s+)(.+)$").unwrap()
});

/// Container build facts derived from the root-level descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    pub has_dockerfile: bool,
    pub has_docker_compose: bool,
    pub dockerfile_path: Option<String>,
    pub docker_compose_path: Option<String>,
    pub exposed_ports: Vec<u16>,
    pub base_image: Option<String>,
    pub workdir: Option<String>,
    pub entrypoint: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    pub env: BTreeMap<String, String>,
}

/// Build artifact plus the project profile recommended for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetection {
    #[serde(flatten)]
    pub artifact: BuildArtifact,
    pub project: ProjectProfile,
}

/// Inspect `owner/repo` for a Dockerfile and a compose file
///
/// A missing file is a normal "not present" result. Any other remote failure
/// propagates, with `NotFound` and `Forbidden` kept distinct.
pub async fn inspect(
    source: &dyn SourceHost,
    owner: &str,
    repo: &str,
) -> Result<ContainerDetection, DeployerError> {
    let repository = source.get_repository(owner, repo).await?;

    let mut artifact = match source.get_file_text(owner, repo, BUILD_DESCRIPTOR).await? {
        Some(content) => {
            debug!("Found {} in {}/{}", BUILD_DESCRIPTOR, owner, repo);
            let mut artifact = parse_dockerfile(&content);
            artifact.has_dockerfile = true;
            artifact.dockerfile_path = Some(BUILD_DESCRIPTOR.to_string());
            artifact
        }
        None => BuildArtifact::default(),
    };

    for candidate in COMPOSE_CANDIDATES {
        if source.get_file_text(owner, repo, candidate).await?.is_some() {
            artifact.has_docker_compose = true;
            artifact.docker_compose_path = Some(candidate.to_string());
            break;
        }
    }

    info!(
        "Inspected {}/{}: dockerfile={} compose={:?} ports={:?}",
        owner, repo, artifact.has_dockerfile, artifact.docker_compose_path, artifact.exposed_ports
    );

    let project = detect_project_type(&repository, &artifact);
    Ok(ContainerDetection { artifact, project })
}

/// Extract base image, work dir, entrypoint, command, ports and env defaults
pub fn parse_dockerfile(content: &str) -> BuildArtifact {
    BuildArtifact {
        base_image: first_capture(&FROM_RE, content),
        workdir: first_capture(&WORKDIR_RE, content),
        entrypoint: first_capture(&ENTRYPOINT_RE, content).map(|v| parse_exec_form(&v)),
        cmd: first_capture(&CMD_RE, content).map(|v| parse_exec_form(&v)),
        exposed_ports: extract_ports(content),
        env: extract_env(content),
        ..Default::default()
    }
}

fn first_capture(re: &Regex, content: &str) -> Option<String> {
    re.captures(content).map(|caps| caps[1].trim().to_string())
}

/// `["a", "b"]` exec form, falling back to the shell form as one argument
pub fn parse_exec_form(value: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(value).unwrap_or_else(|_| vec![value.to_string()])
}

/// Ports declared by `EXPOSE`, sorted and deduplicated
pub fn extract_ports(content: &str) -> Vec<u16> {
    let ports: BTreeSet<u16> = EXPOSE_RE
        .captures_iter(content)
        .flat_map(|caps| {
            caps[1]
                .split_whitespace()
                .filter_map(|token| token.split('/').next()?.parse::<u16>().ok())
                .collect::<Vec<_>>()
        })
        .collect();
    ports.into_iter().collect()
}

/// `ENV KEY=value` and `ENV KEY value` pairs with surrounding quotes stripped
pub fn extract_env(content: &str) -> BTreeMap<String, String> {
    ENV_RE
        .captures_iter(content)
        .map(|caps| {
            let key = caps[1].trim().to_string();
            let value = caps[2].trim();
            let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
            let value = value.strip_suffix(['"', '\'']).unwrap_or(value);
            (key, value.to_string())
        })
        .collect()
}
