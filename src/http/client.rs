//! Admin REST API client

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the admin secret
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client errors
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The underlying HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// Request body could not be encoded
    #[error("failed to marshal request body: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Network or protocol failure
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// Server answered with a non-2xx status
    #[error("api error: status={status} body={body}")]
    Status { status: u16, body: String },
}

/// Stateless request helper for the admin REST API
///
/// Every request carries the secret in `X-API-Key` and a JSON content type.
#[derive(Debug, Clone)]
pub struct AdminHttpClient {
    secret_key: String,
    api_url: String,
    client: Client,
}

impl AdminHttpClient {
    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(secret_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self, HttpError> {
        Self::with_timeout(secret_key, api_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(
        secret_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            secret_key: secret_key.into(),
            api_url: api_url.into(),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issue `method` against `api_url + path`
    ///
    /// Returns the decoded JSON body, or `Value::Null` when the body is empty
    /// or not JSON.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.api_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.secret_key);

        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(method = %method, url = %url, "Sending admin API request");

        let response = request.send().await.map_err(HttpError::Transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(method = %method, url = %url, status = status.as_u16(), "Admin API error");
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(HttpError::Transport)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Admin API response is not JSON");
                Ok(Value::Null)
            }
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, HttpError> {
        self.request::<Value>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, HttpError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, HttpError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, HttpError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.request::<Value>(Method::DELETE, path, None).await
    }
}
