//! Generic HTTP call-and-decode helper shared by the REST APIs.

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::headers::{SessionHeaders, UserIdentity};
use crate::tls::TlsSettings;

/// Query parameter mirroring the anti-forgery header.
pub const XRF_QUERY_PARAM: &str = "xrfkey";

/// Performs REST calls with session headers and configured timeouts.
///
/// Every call gets a fresh anti-forgery key, sent both as the
/// `X-Qlik-Xrfkey` header and the `xrfkey` query parameter.
#[derive(Debug, Clone)]
pub struct RestExecutor {
    http: reqwest::Client,
    identity: UserIdentity,
}

impl RestExecutor {
    /// Builds an executor from the configured timeouts and TLS settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] if the TLS material cannot be applied or
    /// [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tls: &TlsSettings) -> Result<Self, ClientError> {
        let builder = reqwest::Client::builder()
            .user_agent(concat!("qlik-client/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_write_timeout);
        let http = tls.configure_http(builder)?.build()?;
        Ok(Self {
            http,
            identity: config.identity.clone(),
        })
    }

    /// Identity attached to every call.
    #[must_use]
    pub const fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Performs the call and decodes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] on `404`.
    /// - [`ClientError::Request`] on any other status `>= 300`.
    /// - [`ClientError::Decode`] if the body does not match `T`.
    /// - [`ClientError::Http`] on transport failure or timeout.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        let bytes = self.send(method, url, body).await?;
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }

    /// Performs the call without decoding the body.
    ///
    /// # Errors
    ///
    /// Same as [`RestExecutor::call`], minus decoding.
    pub async fn call_unit(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<(), ClientError> {
        self.send(method, url, body).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        mut url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ClientError> {
        let headers = SessionHeaders::new(&self.identity);
        url.query_pairs_mut()
            .append_pair(XRF_QUERY_PARAM, &headers.xrf_key);

        tracing::debug!(%method, path = url.path(), "rest call");
        let mut request = self.http.request(method, url);
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if status.as_u16() >= 300 {
            return Err(ClientError::Request {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
