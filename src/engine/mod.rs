//! Engine JSON-RPC over WebSocket: command model, reply model, session.
//!
//! A caller builds a [`Command`] with one of the constructors in
//! [`command`], hands it to [`EngineSession::execute`], and gets back the
//! decoded [`Response`] or the engine's embedded error.

pub mod command;
pub mod response;
pub mod session;
pub mod sheet;

pub use command::{Command, Params};
pub use response::{EngineError, EngineResult, EngineStream, Response, Return};
pub use session::EngineSession;
pub use sheet::{ChildListData, ChildListDef, Info, MetaDef, SheetParams, SheetParamsEx};
