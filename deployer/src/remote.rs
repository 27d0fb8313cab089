//! Construction of authenticated remote clients

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::errors::DeployerError;
use crate::github::client::GitHubClient;
use crate::github::SourceHost;
use crate::http::client::HttpClient;
use crate::hub::client::HubClient;
use crate::hub::SpaceHost;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds clients for a given set of credentials. Tests substitute mocks here.
pub trait RemoteConnector: Send + Sync {
    fn source(&self, token: Option<&str>) -> Result<Arc<dyn SourceHost>, DeployerError>;

    fn spaces(&self, token: &str, namespace: &str) -> Result<Arc<dyn SpaceHost>, DeployerError>;
}

/// Connector for the real GitHub and Hub endpoints
pub struct HttpConnector {
    github: HttpClient,
    hub: HttpClient,
}

impl HttpConnector {
    pub fn new(settings: &Settings) -> Result<Self, DeployerError> {
        Ok(Self {
            github: HttpClient::new(&settings.github_api_url, REQUEST_TIMEOUT)?,
            hub: HttpClient::new(&settings.hub_url, REQUEST_TIMEOUT)?,
        })
    }
}

impl RemoteConnector for HttpConnector {
    fn source(&self, token: Option<&str>) -> Result<Arc<dyn SourceHost>, DeployerError> {
        Ok(Arc::new(GitHubClient::new(self.github.clone(), token)))
    }

    fn spaces(&self, token: &str, namespace: &str) -> Result<Arc<dyn SpaceHost>, DeployerError> {
        Ok(Arc::new(HubClient::new(self.hub.clone(), token, namespace)))
    }
}
