//! Engine WebSocket session.
//!
//! Owns exactly one WebSocket connection and runs one command/response
//! exchange at a time. Responses are matched by arrival order: `execute`
//! takes `&mut self`, so a second command cannot be written before the
//! previous reply has been read.

use std::fmt;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};

use super::command::Command;
use super::response::Response;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::headers::SessionHeaders;
use crate::tls::TlsSettings;

/// A live engine connection.
///
/// Lifecycle is explicit: [`EngineSession::open`] (or
/// [`EngineSession::connect`]), any number of [`EngineSession::execute`]
/// calls, then [`EngineSession::close`]. There is no reconnection; after a
/// fatal error the session must be dropped and a new one opened.
pub struct EngineSession<S = MaybeTlsStream<TcpStream>> {
    socket: WebSocketStream<S>,
    executed: u64,
}

impl<S> fmt::Debug for EngineSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("executed", &self.executed)
            .finish_non_exhaustive()
    }
}

impl EngineSession {
    /// Opens a TLS WebSocket to the configured engine endpoint.
    ///
    /// The upgrade request carries a fresh anti-forgery key and the
    /// configured user identity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] if the connector cannot be built and
    /// [`ClientError::Connection`] if the dial, TLS handshake or upgrade
    /// fails.
    pub async fn open(config: &ClientConfig, tls: &TlsSettings) -> Result<Self, ClientError> {
        let connector = Connector::NativeTls(tls.native_connector()?);
        let headers = SessionHeaders::new(&config.identity);
        Self::connect(
            &config.engine_url(),
            &headers,
            config.origin.as_deref(),
            Some(connector),
        )
        .await
    }

    /// Connects to `url` with the given headers and connector.
    ///
    /// `ws://` URLs need no connector; `wss://` URLs without one use the
    /// default TLS settings of the underlying library.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] on an invalid URL, a failed dial
    /// or handshake, or a rejected upgrade (with the server's status).
    pub async fn connect(
        url: &str,
        headers: &SessionHeaders,
        origin: Option<&str>,
        connector: Option<Connector>,
    ) -> Result<Self, ClientError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ClientError::Connection {
                message: format!("invalid engine url {url}: {e}"),
                status: None,
            })?;

        for (name, value) in headers.pairs() {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("invalid {name} header: {e}")))?;
            request
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
        if let Some(origin) = origin {
            let value = HeaderValue::from_str(origin)
                .map_err(|e| ClientError::Config(format!("invalid origin header: {e}")))?;
            request.headers_mut().insert(ORIGIN, value);
        }

        let (socket, response) =
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
                .await
                .map_err(connection_error)?;

        tracing::info!(%url, status = response.status().as_u16(), "engine session opened");
        Ok(Self::from_stream(socket))
    }
}

impl<S> EngineSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already established WebSocket.
    #[must_use]
    pub const fn from_stream(socket: WebSocketStream<S>) -> Self {
        Self {
            socket,
            executed: 0,
        }
    }

    /// Writes `command` as one text message and waits for the next reply.
    ///
    /// No timeout is applied; the call returns when a reply arrives, the
    /// read fails, or the peer closes the connection.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Protocol`] if the write, the read or decoding fails,
    ///   or the peer closes the connection. The session is unusable after.
    /// - [`ClientError::Server`] if the reply carries an `error` object. The
    ///   decoded reply is attached and the session stays usable.
    pub async fn execute(&mut self, command: &Command) -> Result<Response, ClientError> {
        let payload = command.to_json().map_err(|e| {
            ClientError::Protocol(format!("failed to encode {}: {e}", command.method))
        })?;

        tracing::debug!(
            method = %command.method,
            id = command.id,
            handle = command.handle,
            "sending engine command"
        );
        self.socket
            .send(Message::text(payload))
            .await
            .map_err(|e| ClientError::Protocol(format!("failed to send {}: {e}", command.method)))?;

        let response = self.read_response().await?;
        self.executed = self.executed.saturating_add(1);

        if response.id != command.id {
            tracing::debug!(
                sent = command.id,
                received = response.id,
                "engine response id differs from command id"
            );
        }
        response.into_result()
    }

    /// Number of commands that received a reply on this session.
    #[must_use]
    pub const fn executed(&self) -> u64 {
        self.executed
    }

    /// Sends a close frame and releases the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] if the close frame cannot be sent,
    /// e.g. because the peer already closed the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket
            .close(None)
            .await
            .map_err(|e| ClientError::Protocol(format!("failed to close session: {e}")))?;
        tracing::info!(executed = self.executed, "engine session closed");
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Response, ClientError> {
        loop {
            let message = match self.socket.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    return Err(ClientError::Protocol(format!(
                        "failed to read response: {e}"
                    )));
                }
                None => {
                    return Err(ClientError::Protocol(
                        "connection closed by peer".to_string(),
                    ));
                }
            };

            let decoded = match &message {
                Message::Text(text) => serde_json::from_str::<Response>(text.as_str()),
                Message::Binary(data) => serde_json::from_slice::<Response>(data),
                Message::Close(frame) => {
                    return Err(ClientError::Protocol(format!(
                        "connection closed by peer: {frame:?}"
                    )));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            return decoded
                .map_err(|e| ClientError::Protocol(format!("failed to decode response: {e}")));
        }
    }
}

fn connection_error(err: tungstenite::Error) -> ClientError {
    match err {
        tungstenite::Error::Http(response) => {
            let status = response.status();
            let body = response
                .body()
                .as_deref()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            ClientError::Connection {
                message: format!("upgrade rejected with {status}: {body}"),
                status: Some(status.as_u16()),
            }
        }
        other => ClientError::Connection {
            message: other.to_string(),
            status: None,
        },
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::io::DuplexStream;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::engine::command;

    /// Starts an in-memory peer that answers each text message with the
    /// next canned reply, then returns a session connected to it. Unless
    /// `hang_up` is set, the peer keeps reading until the client closes.
    async fn session_with_replies(
        replies: Vec<&'static str>,
        hang_up: bool,
    ) -> (
        EngineSession<DuplexStream>,
        tokio::task::JoinHandle<Vec<String>>,
    ) {
        let frames = replies
            .into_iter()
            .map(|reply| vec![Message::text(reply)])
            .collect();
        session_with_frames(frames, hang_up).await
    }

    /// Like [`session_with_replies`], but each request is answered with a
    /// sequence of raw frames.
    async fn session_with_frames(
        replies: Vec<Vec<Message>>,
        hang_up: bool,
    ) -> (
        EngineSession<DuplexStream>,
        tokio::task::JoinHandle<Vec<String>>,
    ) {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);

        let peer = tokio::spawn(async move {
            let Ok(mut ws) = tokio_tungstenite::accept_async(server_io).await else {
                panic!("peer handshake failed");
            };
            let mut received = Vec::new();
            'replies: for frames in replies {
                loop {
                    match ws.next().await {
                        Some(Ok(Message::Text(text))) => {
                            received.push(text.as_str().to_string());
                            break;
                        }
                        Some(Ok(Message::Pong(_))) => {}
                        other => panic!("unexpected frame: {other:?}"),
                    }
                }
                for frame in frames {
                    if ws.send(frame).await.is_err() {
                        break 'replies;
                    }
                }
            }
            if !hang_up {
                while let Some(Ok(_)) = ws.next().await {}
            }
            received
        });

        let Ok((socket, _)) = tokio_tungstenite::client_async("ws://engine/app", client_io).await
        else {
            panic!("client handshake failed");
        };
        (EngineSession::from_stream(socket), peer)
    }

    #[tokio::test]
    async fn get_active_doc_returns_handle() {
        let (mut session, peer) = session_with_replies(vec![
            r#"{"jsonrpc":"2.0","id":1,"result":{"qReturn":{"qType":"Doc","qHandle":1}}}"#,
        ], false)
        .await;

        let Ok(response) = session.execute(&command::get_active_doc()).await else {
            panic!("execute failed");
        };
        let Some(result) = response.result else {
            panic!("missing result");
        };
        assert_eq!(result.r#return.handle, 1);
        assert!(response.error.is_none());
        assert_eq!(session.executed(), 1);
        assert!(session.close().await.is_ok());

        let Ok(received) = peer.await else {
            panic!("peer task failed");
        };
        assert_eq!(
            received,
            vec![r#"{"jsonrpc":"2.0","id":1,"method":"GetActiveDoc","handle":-1,"params":[]}"#]
        );
    }

    #[tokio::test]
    async fn server_error_leaves_session_usable() {
        let (mut session, _peer) = session_with_replies(vec![
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"Invalid param","parameter":"qName"}}"#,
            r#"{"jsonrpc":"2.0","id":2,"result":{"qScript":"LOAD 1;"}}"#,
        ], false)
        .await;

        let Err(err) = session.execute(&command::get_active_doc()).await else {
            panic!("expected server error");
        };
        let message = err.to_string();
        assert!(message.contains('3'));
        assert!(message.contains("Invalid param"));
        assert!(!err.is_fatal());
        assert_eq!(err.response().map(|r| r.id), Some(1));

        let Ok(response) = session.execute(&command::get_script(1)).await else {
            panic!("session not usable after server error");
        };
        assert_eq!(
            response.result.map(|r| r.script),
            Some("LOAD 1;".to_string())
        );
    }

    #[tokio::test]
    async fn control_frames_are_skipped_and_binary_is_decoded() {
        let reply = r#"{"jsonrpc":"2.0","id":2,"result":{"qScript":"LOAD 2;"}}"#;
        let (mut session, _peer) = session_with_frames(
            vec![vec![
                Message::Ping(b"hb".to_vec().into()),
                Message::Pong(b"hb".to_vec().into()),
                Message::binary(reply.as_bytes().to_vec()),
            ]],
            false,
        )
        .await;

        let Ok(response) = session.execute(&command::get_script(1)).await else {
            panic!("execute failed");
        };
        assert_eq!(response.id, 2);
        assert_eq!(
            response.result.map(|r| r.script),
            Some("LOAD 2;".to_string())
        );
        assert!(session.close().await.is_ok());
    }

    #[tokio::test]
    async fn undecodable_reply_is_protocol_error() {
        let (mut session, _peer) = session_with_replies(vec!["not json"], false).await;
        let Err(err) = session.execute(&command::get_stream_list()).await else {
            panic!("expected protocol error");
        };
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn peer_hangup_is_protocol_error() {
        let (mut session, peer) = session_with_replies(vec![], true).await;
        let Ok(_) = peer.await else {
            panic!("peer task failed");
        };
        let Err(err) = session.execute(&command::get_active_doc()).await else {
            panic!("expected protocol error");
        };
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn close_consumes_session() {
        let (session, _peer) = session_with_replies(vec![], false).await;
        assert!(session.close().await.is_ok());
    }
}
