//! Client configuration loaded explicitly or from environment variables.
//!
//! All settings live in a [`ClientConfig`] value handed to the client at
//! construction; nothing is read from process-wide mutable state after
//! that. [`ClientConfig::from_env`] follows 12-factor style and optionally
//! loads a `.env` file via `dotenvy`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ClientError;
use crate::headers::UserIdentity;

/// Default repository (QRS) management port.
pub const DEFAULT_QRS_PORT: u16 = 4242;
/// Default proxy (QPS) auth-ticket port.
pub const DEFAULT_AUTH_PORT: u16 = 4243;
/// Default engine (QIX) WebSocket port.
pub const DEFAULT_ENGINE_PORT: u16 = 4747;
/// Default connect timeout for REST calls, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Default read/write timeout for REST calls, in seconds.
pub const DEFAULT_READ_WRITE_TIMEOUT_SECS: u64 = 30;

/// Filesystem locations of the TLS client material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsLocations {
    /// PEM client certificate.
    pub cert: PathBuf,
    /// PEM (PKCS#8) client private key.
    pub key: PathBuf,
    /// PEM certificate authority used to verify the server.
    pub ca: PathBuf,
}

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or address, without scheme or trailing slash.
    pub server: String,

    /// Directory/user identity sent on every call.
    pub identity: UserIdentity,

    /// Repository (management) API port.
    pub qrs_port: u16,

    /// Proxy (auth-ticket) API port.
    pub auth_port: u16,

    /// Engine WebSocket port.
    pub engine_port: u16,

    /// Connect timeout applied to REST calls.
    pub connect_timeout: Duration,

    /// Read/write timeout applied to REST calls. The engine WebSocket has no
    /// timeout.
    pub read_write_timeout: Duration,

    /// Optional `Origin` header for the WebSocket upgrade.
    pub origin: Option<String>,

    tls: Option<TlsLocations>,
}

impl ClientConfig {
    /// Creates a configuration with default ports and timeouts.
    ///
    /// A single trailing `/` on `server` is removed.
    #[must_use]
    pub fn new(server: &str, directory: &str, user: &str) -> Self {
        let server = server.strip_suffix('/').unwrap_or(server);
        Self {
            server: server.to_string(),
            identity: UserIdentity::new(directory, user),
            qrs_port: DEFAULT_QRS_PORT,
            auth_port: DEFAULT_AUTH_PORT,
            engine_port: DEFAULT_ENGINE_PORT,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_write_timeout: Duration::from_secs(DEFAULT_READ_WRITE_TIMEOUT_SECS),
            origin: None,
            tls: None,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is missing or invalid. TLS
    /// locations are attached only when all three files are readable;
    /// otherwise the client runs without client certificates.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `QLIK_SERVER` is set but empty.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let server = std::env::var("QLIK_SERVER").unwrap_or_else(|_| "localhost".to_string());
        if server.trim().is_empty() {
            return Err(ClientError::Config("QLIK_SERVER is empty".to_string()));
        }
        let directory =
            std::env::var("QLIK_USER_DIRECTORY").unwrap_or_else(|_| "INTERNAL".to_string());
        let user = std::env::var("QLIK_USER").unwrap_or_else(|_| "sa_repository".to_string());

        let mut config = Self::new(server.trim(), &directory, &user);
        config.qrs_port = parse_env("QLIK_QRS_PORT", DEFAULT_QRS_PORT);
        config.auth_port = parse_env("QLIK_AUTH_PORT", DEFAULT_AUTH_PORT);
        config.engine_port = parse_env("QLIK_ENGINE_PORT", DEFAULT_ENGINE_PORT);
        config.connect_timeout = Duration::from_secs(parse_env(
            "QLIK_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        ));
        config.read_write_timeout = Duration::from_secs(parse_env(
            "QLIK_READ_WRITE_TIMEOUT_SECS",
            DEFAULT_READ_WRITE_TIMEOUT_SECS,
        ));
        config.origin = std::env::var("QLIK_ORIGIN").ok().filter(|o| !o.is_empty());

        let cert = env_path("QLIK_CLIENT_CERT", "client.pem");
        let key = env_path("QLIK_CLIENT_KEY", "client_key.pem");
        let ca = env_path("QLIK_CA_FILE", "root.pem");
        if let Err(err) = config.set_tls_locations(&cert, &key, &ca) {
            tracing::debug!(%err, "tls material from environment not attached");
        }

        Ok(config)
    }

    /// Stores the TLS material locations after checking each file is
    /// readable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] naming the first unreadable file
    /// (key, then certificate, then CA). The configuration is left
    /// unchanged in that case.
    pub fn set_tls_locations(
        &mut self,
        cert: &Path,
        key: &Path,
        ca: &Path,
    ) -> Result<(), ClientError> {
        check_readable("client key", key)?;
        check_readable("client cert", cert)?;
        check_readable("ca", ca)?;
        self.tls = Some(TlsLocations {
            cert: cert.to_path_buf(),
            key: key.to_path_buf(),
            ca: ca.to_path_buf(),
        });
        Ok(())
    }

    /// Returns the configured TLS material locations, if any.
    #[must_use]
    pub const fn tls_locations(&self) -> Option<&TlsLocations> {
        self.tls.as_ref()
    }

    /// Base URL of the repository (management) API.
    #[must_use]
    pub fn qrs_base_url(&self) -> String {
        format!("https://{}:{}", self.server, self.qrs_port)
    }

    /// Base URL of the proxy (auth-ticket) API.
    #[must_use]
    pub fn auth_base_url(&self) -> String {
        format!("https://{}:{}", self.server, self.auth_port)
    }

    /// Engine WebSocket endpoint.
    #[must_use]
    pub fn engine_url(&self) -> String {
        format!("wss://{}:{}/app", self.server, self.engine_port)
    }
}

fn check_readable(what: &str, path: &Path) -> Result<(), ClientError> {
    std::fs::read(path).map(|_| ()).map_err(|err| {
        ClientError::Config(format!(
            "error reading {what} bytes from [{}]: {err}",
            path.display()
        ))
    })
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::io::Write;

    use super::*;

    fn pem_file(contents: &str) -> tempfile::NamedTempFile {
        let Ok(mut file) = tempfile::NamedTempFile::new() else {
            panic!("tempfile");
        };
        let Ok(()) = file.write_all(contents.as_bytes()) else {
            panic!("write");
        };
        file
    }

    #[test]
    fn new_trims_one_trailing_slash() {
        let config = ClientConfig::new("qlik.example.com/", "DIR", "alice");
        assert_eq!(config.server, "qlik.example.com");
        assert_eq!(config.qrs_port, DEFAULT_QRS_PORT);
        assert_eq!(config.auth_port, DEFAULT_AUTH_PORT);
        assert_eq!(config.engine_port, DEFAULT_ENGINE_PORT);
        assert!(config.tls_locations().is_none());
    }

    #[test]
    fn urls_use_dedicated_ports() {
        let mut config = ClientConfig::new("qlik", "DIR", "alice");
        config.engine_port = 4848;
        assert_eq!(config.qrs_base_url(), "https://qlik:4242");
        assert_eq!(config.auth_base_url(), "https://qlik:4243");
        assert_eq!(config.engine_url(), "wss://qlik:4848/app");
    }

    #[test]
    fn set_tls_locations_accepts_readable_files() {
        let cert = pem_file("cert");
        let key = pem_file("key");
        let ca = pem_file("ca");
        let mut config = ClientConfig::new("qlik", "DIR", "alice");
        let result = config.set_tls_locations(cert.path(), key.path(), ca.path());
        assert!(result.is_ok());
        let Some(tls) = config.tls_locations() else {
            panic!("tls locations not stored");
        };
        assert_eq!(tls.cert, cert.path());
        assert_eq!(tls.key, key.path());
        assert_eq!(tls.ca, ca.path());
    }

    #[test]
    fn set_tls_locations_names_missing_file() {
        let cert = pem_file("cert");
        let ca = pem_file("ca");
        let mut config = ClientConfig::new("qlik", "DIR", "alice");
        let missing = Path::new("/nonexistent/client_key.pem");
        let Err(err) = config.set_tls_locations(cert.path(), missing, ca.path()) else {
            panic!("expected missing key to fail");
        };
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("client key"));
        assert!(config.tls_locations().is_none());
    }
}
