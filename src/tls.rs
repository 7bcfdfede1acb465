//! TLS material loading for both API surfaces.
//!
//! [`TlsSettings`] reads the client certificate, key and CA from disk once
//! and hands out a `native-tls` connector for the engine WebSocket and a
//! configured `reqwest` builder for the REST APIs. Missing or unusable
//! material falls back to [`TlsMode::Insecure`], which is logged.

use std::fmt;

use crate::config::TlsLocations;
use crate::error::ClientError;

/// How the server certificate is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// A client certificate is presented; the server is verified against
    /// the configured CA (or the system roots when no CA could be loaded).
    ClientCertificate,
    /// No client certificate; server certificates and host names are not
    /// verified.
    Insecure,
}

#[derive(Clone)]
struct ClientMaterial {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
    ca_pem: Option<Vec<u8>>,
}

/// Loaded TLS material plus the resulting verification mode.
#[derive(Clone)]
pub struct TlsSettings {
    material: Option<ClientMaterial>,
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSettings")
            .field("mode", &self.mode())
            .field(
                "ca",
                &self.material.as_ref().is_some_and(|m| m.ca_pem.is_some()),
            )
            .finish_non_exhaustive()
    }
}

impl TlsSettings {
    /// Loads material from `locations`, falling back to insecure mode when
    /// it is absent or cannot be used.
    #[must_use]
    pub fn load(locations: Option<&TlsLocations>) -> Self {
        let Some(locations) = locations else {
            tracing::warn!("no tls material configured, server certificates will not be verified");
            return Self::insecure();
        };

        let (cert_pem, key_pem) =
            match (std::fs::read(&locations.cert), std::fs::read(&locations.key)) {
                (Ok(cert), Ok(key)) => (cert, key),
                (Err(err), _) | (_, Err(err)) => {
                    tracing::warn!(
                        cert = %locations.cert.display(),
                        key = %locations.key.display(),
                        %err,
                        "client certificate unreadable, falling back to insecure tls"
                    );
                    return Self::insecure();
                }
            };

        if let Err(err) = native_tls::Identity::from_pkcs8(&cert_pem, &key_pem) {
            tracing::warn!(%err, "client certificate rejected, falling back to insecure tls");
            return Self::insecure();
        }

        let ca_pem = match std::fs::read(&locations.ca) {
            Ok(ca) if native_tls::Certificate::from_pem(&ca).is_ok() => Some(ca),
            Ok(_) => {
                tracing::warn!(ca = %locations.ca.display(), "ca file is not valid pem, ignoring");
                None
            }
            Err(err) => {
                tracing::warn!(ca = %locations.ca.display(), %err, "error setting up ca file");
                None
            }
        };

        Self {
            material: Some(ClientMaterial {
                cert_pem,
                key_pem,
                ca_pem,
            }),
        }
    }

    /// Settings that present no certificate and verify nothing.
    #[must_use]
    pub fn insecure() -> Self {
        Self { material: None }
    }

    /// Verification mode these settings produce.
    #[must_use]
    pub const fn mode(&self) -> TlsMode {
        if self.material.is_some() {
            TlsMode::ClientCertificate
        } else {
            TlsMode::Insecure
        }
    }

    /// Builds the connector used for the engine WebSocket.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] if the connector cannot be built.
    pub fn native_connector(&self) -> Result<native_tls::TlsConnector, ClientError> {
        let mut builder = native_tls::TlsConnector::builder();
        match &self.material {
            Some(material) => {
                let identity =
                    native_tls::Identity::from_pkcs8(&material.cert_pem, &material.key_pem)
                        .map_err(|e| ClientError::Tls(format!("client identity: {e}")))?;
                builder.identity(identity);
                if let Some(ca) = &material.ca_pem {
                    let root = native_tls::Certificate::from_pem(ca)
                        .map_err(|e| ClientError::Tls(format!("ca certificate: {e}")))?;
                    builder.add_root_certificate(root);
                }
            }
            None => {
                builder
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true);
            }
        }
        builder
            .build()
            .map_err(|e| ClientError::Tls(format!("connector: {e}")))
    }

    /// Applies these settings to a `reqwest` client builder.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] if the identity or CA cannot be parsed.
    pub fn configure_http(
        &self,
        builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, ClientError> {
        let Some(material) = &self.material else {
            return Ok(builder.danger_accept_invalid_certs(true));
        };
        let identity = reqwest::Identity::from_pkcs8_pem(&material.cert_pem, &material.key_pem)
            .map_err(|e| ClientError::Tls(format!("client identity: {e}")))?;
        let mut builder = builder.identity(identity);
        if let Some(ca) = &material.ca_pem {
            let root = reqwest::Certificate::from_pem(ca)
                .map_err(|e| ClientError::Tls(format!("ca certificate: {e}")))?;
            builder = builder.add_root_certificate(root);
        }
        Ok(builder)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::io::Write;

    use super::*;

    fn file_with(contents: &str) -> tempfile::NamedTempFile {
        let Ok(mut file) = tempfile::NamedTempFile::new() else {
            panic!("tempfile");
        };
        let Ok(()) = file.write_all(contents.as_bytes()) else {
            panic!("write");
        };
        file
    }

    #[test]
    fn absent_material_is_insecure() {
        let settings = TlsSettings::load(None);
        assert_eq!(settings.mode(), TlsMode::Insecure);
    }

    #[test]
    fn unreadable_material_is_insecure() {
        let locations = TlsLocations {
            cert: "/nonexistent/client.pem".into(),
            key: "/nonexistent/client_key.pem".into(),
            ca: "/nonexistent/root.pem".into(),
        };
        let settings = TlsSettings::load(Some(&locations));
        assert_eq!(settings.mode(), TlsMode::Insecure);
    }

    #[test]
    fn unparseable_material_is_insecure() {
        let cert = file_with("not a certificate");
        let key = file_with("not a key");
        let ca = file_with("not a ca");
        let locations = TlsLocations {
            cert: cert.path().to_path_buf(),
            key: key.path().to_path_buf(),
            ca: ca.path().to_path_buf(),
        };
        let settings = TlsSettings::load(Some(&locations));
        assert_eq!(settings.mode(), TlsMode::Insecure);
    }

    #[test]
    fn insecure_settings_build_both_connectors() {
        let settings = TlsSettings::insecure();
        assert!(settings.native_connector().is_ok());
        assert!(settings.configure_http(reqwest::Client::builder()).is_ok());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let rendered = format!("{:?}", TlsSettings::insecure());
        assert!(rendered.contains("Insecure"));
        assert!(!rendered.contains("key_pem"));
    }
}
