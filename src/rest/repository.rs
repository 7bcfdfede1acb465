//! Repository (QRS) management API: app listing, copy, publish, reload.

use reqwest::{Method, Url};

use super::executor::RestExecutor;
use super::models::{About, ApplicationResult};
use crate::error::ClientError;

/// Client for the repository API on the management port.
#[derive(Debug, Clone)]
pub struct RepositoryApi {
    executor: RestExecutor,
    base: Url,
}

impl RepositoryApi {
    /// Creates a repository client rooted at `base_url`
    /// (e.g. `https://qlik:4242`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `base_url` is not a valid URL.
    pub fn new(executor: RestExecutor, base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid repository url {base_url}: {e}")))?;
        Ok(Self { executor, base })
    }

    /// Server build information.
    ///
    /// # Errors
    ///
    /// See [`RestExecutor::call`].
    pub async fn about(&self) -> Result<About, ClientError> {
        let url = self.endpoint("/qrs/about")?;
        self.executor.call(Method::GET, url, None).await
    }

    /// All apps visible to the configured user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the endpoint answers `404`; see
    /// [`RestExecutor::call`] for the rest.
    pub async fn list(&self) -> Result<Vec<ApplicationResult>, ClientError> {
        let url = self.endpoint("/qrs/app")?;
        self.executor.call(Method::GET, url, None).await
    }

    /// Copies `app_id` into a new app called `name`.
    ///
    /// # Errors
    ///
    /// See [`RestExecutor::call`].
    pub async fn copy(&self, app_id: &str, name: &str) -> Result<ApplicationResult, ClientError> {
        let mut url = self.app_endpoint(app_id, "copy")?;
        url.query_pairs_mut().append_pair("name", name);
        self.executor.call(Method::POST, url, None).await
    }

    /// Publishes `app_id` to `stream_id` under `name`.
    ///
    /// # Errors
    ///
    /// See [`RestExecutor::call`].
    pub async fn publish(
        &self,
        app_id: &str,
        stream_id: &str,
        name: &str,
    ) -> Result<ApplicationResult, ClientError> {
        let mut url = self.app_endpoint(app_id, "publish")?;
        url.query_pairs_mut()
            .append_pair("stream", stream_id)
            .append_pair("name", name);
        self.executor.call(Method::PUT, url, None).await
    }

    /// Triggers a server-side reload of `app_id`. The response body is not
    /// decoded.
    ///
    /// # Errors
    ///
    /// See [`RestExecutor::call_unit`].
    pub async fn reload(&self, app_id: &str) -> Result<(), ClientError> {
        let url = self.app_endpoint(app_id, "reload")?;
        self.executor.call_unit(Method::GET, url, None).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Config(format!("invalid repository path {path}: {e}")))
    }

    /// `/qrs/app/{app_id}/{action}`, with `app_id` escaped as one segment.
    fn app_endpoint(&self, app_id: &str, action: &str) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("invalid repository url {}", self.base)))?
            .pop_if_empty()
            .extend(["qrs", "app", app_id, action]);
        Ok(url)
    }
}
