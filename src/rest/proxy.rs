//! Proxy (QPS) auth-ticket API.

use reqwest::{Method, Url};

use super::executor::RestExecutor;
use super::models::{Ticket, TicketRequest};
use crate::error::ClientError;

/// Client for the proxy API on the auth-ticket port.
#[derive(Debug, Clone)]
pub struct ProxyApi {
    executor: RestExecutor,
    base: Url,
}

impl ProxyApi {
    /// Creates a proxy client rooted at `base_url`
    /// (e.g. `https://qlik:4243`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `base_url` is not a valid URL.
    pub fn new(executor: RestExecutor, base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid proxy url {base_url}: {e}")))?;
        Ok(Self { executor, base })
    }

    /// Requests an authentication ticket for the executor's identity.
    ///
    /// # Errors
    ///
    /// See [`RestExecutor::call`].
    pub async fn request_ticket(&self) -> Result<Ticket, ClientError> {
        let url = self
            .base
            .join("/qps/ticket")
            .map_err(|e| ClientError::Config(format!("invalid proxy path: {e}")))?;
        let identity = self.executor.identity();
        let body = serde_json::to_vec(&TicketRequest {
            user_directory: identity.directory.clone(),
            user_id: identity.user.clone(),
        })
        .map_err(|e| ClientError::Config(format!("invalid ticket request: {e}")))?;
        self.executor.call(Method::POST, url, Some(body)).await
    }
}
