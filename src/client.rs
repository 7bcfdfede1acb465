//! Client facade combining the REST APIs and the engine session.

use crate::config::ClientConfig;
use crate::engine::command;
use crate::engine::{Command, EngineSession, Response, SheetParams};
use crate::error::ClientError;
use crate::rest::{About, ApplicationResult, ProxyApi, RepositoryApi, RestExecutor, Ticket};
use crate::tls::TlsSettings;

/// API client owning the configuration, the REST clients and at most one
/// engine session.
///
/// Engine operations require [`QlikClient::open_engine`] first. The
/// session is exclusively owned: callers needing concurrent access must
/// serialize it themselves (e.g. behind a `tokio::sync::Mutex`).
#[derive(Debug)]
pub struct QlikClient {
    config: ClientConfig,
    tls: TlsSettings,
    repository: RepositoryApi,
    proxy: ProxyApi,
    engine: Option<EngineSession>,
}

impl QlikClient {
    /// Builds a client, loading TLS material from the configured locations.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] or [`ClientError::Http`] if the HTTP
    /// client cannot be built, [`ClientError::Config`] on invalid base URLs.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let tls = TlsSettings::load(config.tls_locations());
        let executor = RestExecutor::new(&config, &tls)?;
        let repository = RepositoryApi::new(executor.clone(), &config.qrs_base_url())?;
        let proxy = ProxyApi::new(executor, &config.auth_base_url())?;
        Ok(Self {
            config,
            tls,
            repository,
            proxy,
            engine: None,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The repository (management) API.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryApi {
        &self.repository
    }

    /// The proxy (auth-ticket) API.
    #[must_use]
    pub const fn proxy(&self) -> &ProxyApi {
        &self.proxy
    }

    // -- engine session --------------------------------------------------

    /// Opens the engine WebSocket, replacing any session already held.
    ///
    /// # Errors
    ///
    /// See [`EngineSession::open`].
    pub async fn open_engine(&mut self) -> Result<(), ClientError> {
        let session = EngineSession::open(&self.config, &self.tls).await?;
        self.attach_engine(session);
        Ok(())
    }

    /// Installs an already connected session.
    pub fn attach_engine(&mut self, session: EngineSession) {
        if self.engine.replace(session).is_some() {
            tracing::debug!("previous engine session dropped");
        }
    }

    /// Closes the engine session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if no session is open, or the
    /// error from [`EngineSession::close`].
    pub async fn close_engine(&mut self) -> Result<(), ClientError> {
        let session = self.engine.take().ok_or(ClientError::NotConnected)?;
        session.close().await
    }

    /// Returns `true` while an engine session is held.
    #[must_use]
    pub const fn is_engine_open(&self) -> bool {
        self.engine.is_some()
    }

    /// Executes one command on the engine session.
    ///
    /// A fatal error drops the session; [`ClientError::Server`] does not.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] without a session, otherwise
    /// see [`EngineSession::execute`].
    pub async fn execute(&mut self, command: &Command) -> Result<Response, ClientError> {
        let session = self.engine.as_mut().ok_or(ClientError::NotConnected)?;
        let result = session.execute(command).await;
        if let Err(err) = &result
            && err.is_fatal()
        {
            self.engine = None;
        }
        result
    }

    // -- engine operations -----------------------------------------------

    /// Creates an app called `name`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn create_app(&mut self, name: &str) -> Result<Response, ClientError> {
        self.execute(&command::create_app(name)).await
    }

    /// Creates a document called `name` with `CreateDocEx`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn create_doc_ex(&mut self, name: &str) -> Result<Response, ClientError> {
        self.execute(&command::create_doc_ex(name)).await
    }

    /// Opens document `name` as the configured identity.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn open_doc(&mut self, name: &str) -> Result<Response, ClientError> {
        let identity = &self.config.identity;
        let command = command::open_doc(name, &identity.directory, &identity.user);
        self.execute(&command).await
    }

    /// Fetches the document currently open on the session.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn get_active_doc(&mut self) -> Result<Response, ClientError> {
        self.execute(&command::get_active_doc()).await
    }

    /// Replaces the load script of the document at `handle`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn set_script(&mut self, handle: i64, script: &str) -> Result<Response, ClientError> {
        self.execute(&command::set_script(handle, script)).await
    }

    /// Reads the load script of the document at `handle`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn get_script(&mut self, handle: i64) -> Result<Response, ClientError> {
        self.execute(&command::get_script(handle)).await
    }

    /// Creates a sheet in the document at `handle`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create_sheet(
        &mut self,
        handle: i64,
        title: &str,
        description: &str,
        thumbnail: &str,
        id: &str,
        rows: i64,
        columns: i64,
        rank: i64,
    ) -> Result<Response, ClientError> {
        let params = SheetParams::new(title, description, thumbnail, id, rows, columns, rank);
        let command = command::create_sheet(handle, params);
        tracing::debug!(json = ?command.to_json().ok(), "create sheet");
        self.execute(&command).await
    }

    /// Lists the streams visible to the session user.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn list_streams(&mut self) -> Result<Response, ClientError> {
        self.execute(&command::get_stream_list()).await
    }

    /// Runs the load script of the document at `handle`.
    ///
    /// # Errors
    ///
    /// See [`QlikClient::execute`].
    pub async fn do_reload(&mut self, handle: i64) -> Result<Response, ClientError> {
        self.execute(&command::do_reload(handle)).await
    }

    // -- REST operations -------------------------------------------------

    /// Server build information.
    ///
    /// # Errors
    ///
    /// See [`RepositoryApi::about`].
    pub async fn about(&self) -> Result<About, ClientError> {
        self.repository.about().await
    }

    /// All apps visible to the configured user.
    ///
    /// # Errors
    ///
    /// See [`RepositoryApi::list`].
    pub async fn list_apps(&self) -> Result<Vec<ApplicationResult>, ClientError> {
        self.repository.list().await
    }

    /// Copies an app.
    ///
    /// # Errors
    ///
    /// See [`RepositoryApi::copy`].
    pub async fn copy_app(&self, app_id: &str, name: &str) -> Result<ApplicationResult, ClientError> {
        self.repository.copy(app_id, name).await
    }

    /// Publishes an app to a stream.
    ///
    /// # Errors
    ///
    /// See [`RepositoryApi::publish`].
    pub async fn publish_app(
        &self,
        app_id: &str,
        stream_id: &str,
        name: &str,
    ) -> Result<ApplicationResult, ClientError> {
        self.repository.publish(app_id, stream_id, name).await
    }

    /// Triggers a server-side reload of an app.
    ///
    /// # Errors
    ///
    /// See [`RepositoryApi::reload`].
    pub async fn reload_app(&self, app_id: &str) -> Result<(), ClientError> {
        self.repository.reload(app_id).await
    }

    /// Requests an authentication ticket for the configured identity.
    ///
    /// # Errors
    ///
    /// See [`ProxyApi::request_ticket`].
    pub async fn request_ticket(&self) -> Result<Ticket, ClientError> {
        self.proxy.request_ticket().await
    }
}
