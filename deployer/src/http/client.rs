//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::DeployerError;

/// JSON/bytes REST client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeployerError> {
        let user_agent = format!("gh2hf-deployer/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let request = self.client.request(method, &url);
        match token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and turn a non-success status into `RemoteError`
    async fn execute(&self, request: RequestBuilder) -> Result<Response, DeployerError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP request to {} failed: {} - {}", url, status, body);
            return Err(DeployerError::remote(status.as_u16(), error_message(&body, status)));
        }

        Ok(response)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        accept: Option<&str>,
    ) -> Result<T, DeployerError> {
        let mut request = self.request(Method::GET, path, token);
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        let body = self.execute(request).await?.json().await?;
        Ok(body)
    }

    /// Make a GET request, mapping 404 to `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Option<T>, DeployerError> {
        match self.get(path, token, accept).await {
            Ok(body) => Ok(Some(body)),
            Err(DeployerError::RemoteError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make a GET request and return the raw body
    pub async fn get_bytes(
        &self,
        path: &str,
        token: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Vec<u8>, DeployerError> {
        let mut request = self.request(Method::GET, path, token);
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        let bytes = self.execute(request).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, DeployerError> {
        let request = self.request(Method::POST, path, token).json(body);
        let body = self.execute(request).await?.json().await?;
        Ok(body)
    }

    /// POST a newline-delimited JSON body
    pub async fn post_ndjson<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: String,
    ) -> Result<T, DeployerError> {
        let request = self
            .request(Method::POST, path, token)
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        let body = self.execute(request).await?.json().await?;
        Ok(body)
    }

    /// Make a DELETE request with a JSON body; the response body is ignored
    pub async fn delete<B: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<(), DeployerError> {
        let request = self.request(Method::DELETE, path, token).json(body);
        self.execute(request).await?;
        Ok(())
    }
}

/// Pull a human readable message out of an error body
///
/// GitHub answers `{"message": ...}`, the Hub answers `{"error": ...}`.
pub fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    });

    match field {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}
