//! Client error types.
//!
//! [`ClientError`] is the single error type returned by every public
//! operation, REST or engine. Variants carry enough context (status code,
//! engine error code/message/parameter) to diagnose a failure without
//! inspecting the transport.

use crate::engine::Response;

/// Error enum shared by the engine session and the REST executor.
///
/// # Fatality
///
/// | Variant        | Surface   | Session after the error |
/// |----------------|-----------|-------------------------|
/// | `Connection`   | engine    | never opened            |
/// | `Protocol`     | engine    | invalid, re-open        |
/// | `Server`       | engine    | still usable            |
/// | `NotFound`     | REST      | n/a                     |
/// | `Request`      | REST      | n/a                     |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TLS dial, WebSocket handshake or upgrade failed.
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the failure, including the handshake response
        /// when the server sent one.
        message: String,
        /// HTTP status of the rejected upgrade, if any.
        status: Option<u16>,
    },

    /// Write, read or decode failure on an established engine connection.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The engine answered with a populated `error` object.
    ///
    /// The decoded [`Response`] is kept so callers can inspect diagnostic
    /// fields that arrived alongside the error.
    #[error("engine error [{code}]: {message} - {parameter}")]
    Server {
        /// Engine error code.
        code: i64,
        /// Human-readable engine message.
        message: String,
        /// Name of the offending parameter, possibly empty.
        parameter: String,
        /// The full response the error arrived in.
        response: Box<Response>,
    },

    /// The REST endpoint answered `404 Not Found`.
    #[error("does not exist")]
    NotFound,

    /// The REST endpoint answered with any other status `>= 300`.
    #[error("error during request [{status}]: {reason}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// A REST response body could not be decoded into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// HTTP transport failure (connect, timeout, body read).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// TLS connector could not be built from the loaded material.
    #[error("tls error: {0}")]
    Tls(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An engine operation was attempted without an open session.
    #[error("engine session is not open")]
    NotConnected,
}

impl ClientError {
    /// Returns `true` if the error invalidates the engine session.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Protocol(_))
    }

    /// Returns the response carried by a [`ClientError::Server`] error.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Server { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::Request { status, .. } => Some(*status),
            Self::Connection { status, .. } => *status,
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display_carries_code_message_parameter() {
        let err = ClientError::Server {
            code: 3,
            message: "Invalid param".to_string(),
            parameter: "qName".to_string(),
            response: Box::default(),
        };
        assert_eq!(err.to_string(), "engine error [3]: Invalid param - qName");
        assert!(!err.is_fatal());
        assert!(err.response().is_some());
    }

    #[test]
    fn fatal_variants() {
        let conn = ClientError::Connection {
            message: "refused".to_string(),
            status: None,
        };
        assert!(conn.is_fatal());
        assert!(ClientError::Protocol("eof".to_string()).is_fatal());
        assert!(!ClientError::NotFound.is_fatal());
        assert!(!ClientError::NotConnected.is_fatal());
    }

    #[test]
    fn not_found_is_distinct_from_request() {
        assert_eq!(ClientError::NotFound.to_string(), "does not exist");
        assert_eq!(ClientError::NotFound.status(), Some(404));

        let err = ClientError::Request {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error during request [500]: Internal Server Error"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn rejected_upgrade_exposes_status() {
        let err = ClientError::Connection {
            message: "upgrade rejected".to_string(),
            status: Some(403),
        };
        assert_eq!(err.status(), Some(403));
        assert!(err.response().is_none());
    }
}
