//! Network fetch capability.

use std::time::Duration;

use async_trait::async_trait;
use candgig_core::{CandgigResult, NetworkError};
use reqwest::Client;

use crate::http::{Request, Response};

/// Performs real fetches on behalf of the worker.
///
/// An `Err` means the request never produced a response (unreachable host,
/// aborted request). Non-2xx responses are returned as `Ok`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> CandgigResult<Response>;
}

/// [`Network`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Create a network whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> CandgigResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Unreachable {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client))
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> CandgigResult<Response> {
        let unreachable = |e: reqwest::Error| NetworkError::Unreachable {
            url: request.url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(unreachable)?;

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
