//! Engine reply envelope.
//!
//! Every field tolerates absence: the engine only sends what is relevant to
//! the method that was called.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// JSON-RPC reply from the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echoed protocol version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jsonrpc: String,
    /// Echoed correlation id.
    #[serde(default)]
    pub id: i64,
    /// Method result, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EngineResult>,
    /// Structured error, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EngineError>,
    /// Handles whose layout changed as a side effect of the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Vec<i64>>,
}

impl Response {
    /// Converts a response carrying a populated `error` into
    /// [`ClientError::Server`], keeping the whole response inside the error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] when `error` is present.
    pub fn into_result(self) -> Result<Self, ClientError> {
        match self.error.clone() {
            Some(error) => Err(error.into_error(self)),
            None => Ok(self),
        }
    }

    /// Handle returned by methods that open or create an object
    /// (`qReturn.qHandle`, falling back to `qHandle`).
    #[must_use]
    pub fn handle(&self) -> Option<i64> {
        let result = self.result.as_ref()?;
        match (result.r#return.handle, result.handle) {
            (0, 0) => None,
            (0, handle) | (handle, _) => Some(handle),
        }
    }
}

/// Method-specific result payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineResult {
    /// Operation success flag.
    #[serde(rename = "qSuccess")]
    pub success: bool,
    /// Id of a newly created app.
    #[serde(rename = "qAppId", skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    /// Object type tag.
    #[serde(rename = "qType", skip_serializing_if = "String::is_empty")]
    pub object_type: String,
    /// Object handle.
    #[serde(rename = "qHandle")]
    pub handle: i64,
    /// Load script text (`GetScript`).
    #[serde(rename = "qScript", skip_serializing_if = "String::is_empty")]
    pub script: String,
    /// Streams visible to the user (`GetStreamList`).
    #[serde(rename = "qStreamList", skip_serializing_if = "Vec::is_empty")]
    pub stream_list: Vec<EngineStream>,
    /// Returned object reference (`OpenDoc`, `GetActiveDoc`, `CreateObject`).
    #[serde(rename = "qReturn")]
    pub r#return: Return,
}

/// Object reference inside a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Return {
    /// Object type tag, e.g. `Doc`.
    #[serde(rename = "qType", skip_serializing_if = "String::is_empty")]
    pub object_type: String,
    /// Handle to use in subsequent commands.
    #[serde(rename = "qHandle")]
    pub handle: i64,
}

/// A stream entry from `GetStreamList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineStream {
    /// Stream id.
    #[serde(rename = "qId")]
    pub id: String,
    /// Stream name.
    #[serde(rename = "qName")]
    pub name: String,
}

/// Structured error embedded in a [`Response`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineError {
    /// Engine error code.
    pub code: i64,
    /// Offending parameter name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parameter: String,
    /// Human-readable message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl EngineError {
    /// Builds the error value returned to callers, attaching `response`.
    #[must_use]
    pub fn into_error(self, response: Response) -> ClientError {
        ClientError::Server {
            code: self.code,
            message: self.message,
            parameter: self.parameter,
            response: Box::new(response),
        }
    }
}
