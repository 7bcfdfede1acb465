//! REST surface: repository (management) and proxy (auth-ticket) APIs.
//!
//! Both share one [`RestExecutor`], which attaches the session headers and
//! maps HTTP statuses onto [`crate::error::ClientError`].

pub mod executor;
pub mod models;
pub mod proxy;
pub mod repository;

pub use executor::RestExecutor;
pub use models::{About, ApplicationResult, Owner, Stream, Ticket};
pub use proxy::ProxyApi;
pub use repository::RepositoryApi;
