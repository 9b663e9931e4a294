//! HTTP plumbing shared by the typed service clients

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Thin wrapper around a reqwest client bound to one service base URL.
///
/// The bearer token is passed per call, not stored: it is the caller's
/// capability and changes from request to request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode_response(response).await
    }

    /// Make a GET request that only asks "does this resource exist?"
    ///
    /// 2xx means yes, 404 means no; anything else is an upstream failure.
    pub async fn exists(&self, path: &str, token: &str) -> ClientResult<bool> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Err(Self::status_error(status, response).await)
    }

    /// Make a bodyless PUT request, discarding any response payload
    pub async fn put_empty(&self, path: &str, token: &str) -> ClientResult<()> {
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Make a bodyless POST request, discarding any response payload
    pub async fn post_empty(&self, path: &str, token: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Make a POST request with a JSON body, discarding any response payload
    pub async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn decode_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn check_status(response: Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }
        Ok(())
    }

    async fn status_error(status: StatusCode, response: Response) -> ClientError {
        // Keep the body verbatim; the credit flow surfaces it unchanged.
        let message = response.text().await.unwrap_or_default();
        ClientError::Status {
            status: status.as_u16(),
            message,
        }
    }
}
