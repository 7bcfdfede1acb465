//! # qlik-client
//!
//! Async client for a Qlik Sense server's two API surfaces: the repository
//! REST API (app listing, copy, publish, reload) and the engine JSON-RPC
//! protocol carried over a persistent TLS WebSocket (app creation, script
//! editing, sheet creation, reload execution).
//!
//! ## Architecture
//!
//! ```text
//! QlikClient (client)
//!     │
//!     ├── EngineSession (engine/)  ── one WebSocket, one command at a time
//!     │       └── Command / Response envelopes
//!     │
//!     ├── RepositoryApi, ProxyApi (rest/)
//!     │       └── RestExecutor  ── timeouts, status mapping
//!     │
//!     ├── SessionHeaders (headers)  ── xrf key + user identity, per request
//!     └── ClientConfig, TlsSettings (config, tls)
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod headers;
pub mod rest;
pub mod tls;

pub use client::QlikClient;
pub use config::ClientConfig;
pub use error::ClientError;
