//! Hub REST client

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use url::Url;

use api_models::Visibility;
use remote_models::hub::{
    CommitFile, CommitHeader, CommitLine, CommitResponse, CreateRepoRequest, CreateRepoResponse,
    DeleteRepoRequest, SpaceInfo, WhoAmI,
};

use crate::errors::DeployerError;
use crate::http::client::HttpClient;
use crate::hub::status::UNKNOWN_STATUS;
use crate::hub::{CreateSpaceParams, SpaceHandle, SpaceHost};

const REPO_TYPE_SPACE: &str = "space";
const DEFAULT_REVISION: &str = "main";

/// Hub client bound to one token and namespace
pub struct HubClient {
    http: HttpClient,
    token: SecretString,
    namespace: String,
}

impl HubClient {
    pub fn new(http: HttpClient, token: &str, namespace: &str) -> Self {
        Self {
            http,
            token: SecretString::from(token.to_string()),
            namespace: namespace.to_string(),
        }
    }

    fn token(&self) -> Option<&str> {
        Some(self.token.expose_secret())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DeployerError> {
        let mut url = Url::parse(self.http.base_url())
            .map_err(|e| DeployerError::ConfigError(format!("Invalid Hub URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DeployerError::ConfigError("Hub URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Public page of a Space
    pub fn space_url(&self, space_id: &str) -> String {
        format!("{}/spaces/{}", self.http.base_url(), space_id)
    }
}

/// Split `namespace/name`
fn split_space_id(space_id: &str) -> Result<(&str, &str), DeployerError> {
    space_id
        .split_once('/')
        .filter(|(ns, name)| !ns.is_empty() && !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| DeployerError::ValidationError(format!("Invalid Space id: {}", space_id)))
}

/// NDJSON body of a single-file commit
pub fn commit_body(path: &str, content: &[u8]) -> Result<String, DeployerError> {
    let lines = [
        CommitLine::Header(CommitHeader {
            summary: format!("Upload {}", path),
            description: String::new(),
        }),
        CommitLine::File(CommitFile {
            content: STANDARD.encode(content),
            path: path.to_string(),
            encoding: "base64".to_string(),
        }),
    ];

    let mut body = String::new();
    for line in &lines {
        body.push_str(&serde_json::to_string(line)?);
        body.push('\n');
    }
    Ok(body)
}

#[async_trait]
impl SpaceHost for HubClient {
    async fn create_space(&self, params: &CreateSpaceParams) -> Result<SpaceHandle, DeployerError> {
        let url = self.endpoint(&["api", "repos", "create"])?;
        let request = CreateRepoRequest {
            kind: REPO_TYPE_SPACE.to_string(),
            name: params.name.clone(),
            organization: Some(self.namespace.clone()),
            private: params.visibility.is_private(),
            sdk: params.sdk.as_str().to_string(),
            hardware: Some(params.hardware.as_str().to_string()),
        };

        let response: CreateRepoResponse = self.http.post(url.as_str(), self.token(), &request).await?;
        let id = format!("{}/{}", self.namespace, params.name);
        info!("Created Space {} ({})", id, response.url);

        Ok(SpaceHandle {
            url: self.space_url(&id),
            id,
            raw_status: UNKNOWN_STATUS.to_string(),
            status: UNKNOWN_STATUS.to_string(),
            visibility: params.visibility,
            hardware: Some(params.hardware.as_str().to_string()),
            sdk: Some(params.sdk.as_str().to_string()),
        })
    }

    async fn upload_file(
        &self,
        space_id: &str,
        path: &str,
        content: &[u8],
    ) -> Result<(), DeployerError> {
        let (namespace, name) = split_space_id(space_id)?;
        let url = self.endpoint(&["api", "spaces", namespace, name, "commit", DEFAULT_REVISION])?;

        let response: CommitResponse = self
            .http
            .post_ndjson(url.as_str(), self.token(), commit_body(path, content)?)
            .await?;
        debug!(
            "Committed {} to {} ({})",
            path,
            space_id,
            response.commit_oid.as_deref().unwrap_or("no oid")
        );
        Ok(())
    }

    async fn get_space_status(&self, space_id: &str) -> Result<SpaceHandle, DeployerError> {
        let (namespace, name) = split_space_id(space_id)?;
        let url = self.endpoint(&["api", "spaces", namespace, name])?;
        let info: SpaceInfo = self.http.get(url.as_str(), self.token(), None).await?;

        let runtime = info.runtime.unwrap_or_default();
        let raw_status = if runtime.stage.is_empty() {
            UNKNOWN_STATUS.to_string()
        } else {
            runtime.stage
        };
        let hardware = runtime.hardware.and_then(|hw| hw.current.or(hw.requested));

        Ok(SpaceHandle {
            id: space_id.to_string(),
            url: self.space_url(space_id),
            status: raw_status.to_lowercase(),
            raw_status,
            visibility: if info.private {
                Visibility::Private
            } else {
                Visibility::Public
            },
            hardware,
            sdk: info.sdk,
        })
    }

    async fn delete_space(&self, space_id: &str) -> Result<(), DeployerError> {
        let (namespace, name) = split_space_id(space_id)?;
        let url = self.endpoint(&["api", "repos", "delete"])?;
        let request = DeleteRepoRequest {
            kind: REPO_TYPE_SPACE.to_string(),
            name: name.to_string(),
            organization: Some(namespace.to_string()),
        };

        self.http.delete(url.as_str(), self.token(), &request).await?;
        info!("Deleted Space {}", space_id);
        Ok(())
    }

    async fn whoami(&self) -> Result<String, DeployerError> {
        let url = self.endpoint(&["api", "whoami-v2"])?;
        let me: WhoAmI = self.http.get(url.as_str(), self.token(), None).await?;
        Ok(me.name)
    }
}
