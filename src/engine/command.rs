//! Engine request envelope and constructors for each supported method.
//!
//! Each constructor fixes the method name and the small constant
//! correlation id historically used for that call type. Ids are echoed by
//! the engine but never required to be unique within a session.

use serde::{Deserialize, Serialize};

use super::sheet::{SheetParams, SheetParamsEx};
use crate::headers::UserIdentity;

/// Protocol version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Handle value meaning "no handle" (global object / new object).
pub const NO_HANDLE: i64 = -1;

/// Positional parameter list, one variant per method family.
///
/// Serialized as a plain JSON array. The sheet shapes reject each other's
/// keys, so decoding picks the variant that was encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Positional string arguments (`CreateApp`, `OpenDoc`, `SetScript`, ...).
    Strings(Vec<String>),
    /// A single sheet property object (`CreateObject`).
    Sheet(Vec<SheetParams>),
    /// A single sheet property object with a child list (`CreateObject`).
    SheetEx(Vec<SheetParamsEx>),
}

impl Params {
    /// Empty parameter list.
    #[must_use]
    pub const fn none() -> Self {
        Self::Strings(Vec::new())
    }

    /// Number of positional parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Strings(v) => v.len(),
            Self::Sheet(v) => v.len(),
            Self::SheetEx(v) => v.len(),
        }
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON-RPC request sent to the engine.
///
/// `id` and `handle` are omitted from the wire form when zero and `delta`
/// when false; `params` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Protocol version, always `"2.0"`.
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Correlation id echoed back by the engine.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    /// Engine method name.
    pub method: String,
    /// Target object handle, [`NO_HANDLE`] for the global object.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub handle: i64,
    /// Request delta-encoded results.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub delta: bool,
    /// Positional parameters.
    pub params: Params,
}

impl Command {
    /// Builds a command with the given id, method, handle and parameters.
    #[must_use]
    pub fn new(id: i64, method: &str, handle: i64, params: Params) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.to_string(),
            handle,
            delta: false,
            params,
        }
    }

    /// Renders the wire form of the command.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for the parameter types
    /// defined in this crate.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `CreateApp [name]` on the global object.
#[must_use]
pub fn create_app(name: &str) -> Command {
    Command::new(0, "CreateApp", NO_HANDLE, strings([name]))
}

/// `CreateDocEx [name]` on the global object.
#[must_use]
pub fn create_doc_ex(name: &str) -> Command {
    Command::new(0, "CreateDocEx", NO_HANDLE, strings([name]))
}

/// `OpenDoc [name, "UserDirectory=<dir>; UserId=<user>"]` on the global
/// object.
#[must_use]
pub fn open_doc(name: &str, directory: &str, user: &str) -> Command {
    let identity = UserIdentity::new(directory, user);
    Command::new(
        0,
        "OpenDoc",
        NO_HANDLE,
        strings([name, identity.header_value().as_str()]),
    )
}

/// `GetActiveDoc []` on the global object.
#[must_use]
pub fn get_active_doc() -> Command {
    Command::new(1, "GetActiveDoc", NO_HANDLE, Params::none())
}

/// `SetScript [script]` on a document handle.
#[must_use]
pub fn set_script(handle: i64, script: &str) -> Command {
    Command::new(3, "SetScript", handle, strings([script]))
}

/// `GetScript []` on a document handle.
#[must_use]
pub fn get_script(handle: i64) -> Command {
    Command::new(2, "GetScript", handle, Params::none())
}

/// `GetStreamList []` on the global object.
#[must_use]
pub fn get_stream_list() -> Command {
    Command::new(0, "GetStreamList", NO_HANDLE, Params::none())
}

/// `DoReload []` on a document handle.
#[must_use]
pub fn do_reload(handle: i64) -> Command {
    Command::new(2, "DoReload", handle, Params::none())
}

/// `CreateObject [params]` on a document handle.
#[must_use]
pub fn create_sheet(handle: i64, params: SheetParams) -> Command {
    Command::new(12, "CreateObject", handle, Params::Sheet(vec![params]))
}

/// `CreateObject [params]` on a document handle, with a child list.
#[must_use]
pub fn create_sheet_ex(handle: i64, params: SheetParamsEx) -> Command {
    Command::new(12, "CreateObject", handle, Params::SheetEx(vec![params]))
}

fn strings<const N: usize>(values: [&str; N]) -> Params {
    Params::Strings(values.iter().map(|v| (*v).to_string()).collect())
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

const fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn string_params(command: &Command) -> Vec<String> {
        match &command.params {
            Params::Strings(v) => v.clone(),
            other => panic!("expected string params, got {other:?}"),
        }
    }

    #[test]
    fn constructors_match_positional_contract() {
        let cases: Vec<(Command, i64, &str, i64, Vec<&str>)> = vec![
            (create_app("Sales"), 0, "CreateApp", -1, vec!["Sales"]),
            (create_doc_ex("Sales"), 0, "CreateDocEx", -1, vec!["Sales"]),
            (
                open_doc("Sales.qvf", "INTERNAL", "sa_repository"),
                0,
                "OpenDoc",
                -1,
                vec!["Sales.qvf", "UserDirectory=INTERNAL; UserId=sa_repository"],
            ),
            (get_active_doc(), 1, "GetActiveDoc", -1, vec![]),
            (set_script(1, "LOAD 1 AS x AUTOGENERATE 1;"), 3, "SetScript", 1, vec![
                "LOAD 1 AS x AUTOGENERATE 1;",
            ]),
            (get_script(1), 2, "GetScript", 1, vec![]),
            (get_stream_list(), 0, "GetStreamList", -1, vec![]),
            (do_reload(4), 2, "DoReload", 4, vec![]),
        ];

        for (command, id, method, handle, params) in cases {
            assert_eq!(command.jsonrpc, "2.0");
            assert_eq!(command.id, id, "{method}");
            assert_eq!(command.method, method);
            assert_eq!(command.handle, handle, "{method}");
            assert!(!command.delta);
            assert_eq!(string_params(&command), params, "{method}");
        }
    }

    #[test]
    fn create_sheet_wraps_single_object() {
        let command = create_sheet(1, SheetParams::new("Sheet", "", "", "SH01", 12, 24, 0));
        assert_eq!(command.id, 12);
        assert_eq!(command.method, "CreateObject");
        assert_eq!(command.handle, 1);
        assert_eq!(command.params.len(), 1);
        assert!(matches!(command.params, Params::Sheet(_)));

        let ex = create_sheet_ex(1, SheetParamsEx::new("Sheet", "", "SH01"));
        assert!(matches!(ex.params, Params::SheetEx(_)));
    }

    #[test]
    fn wire_form_omits_zero_id_and_false_delta() {
        let Ok(json) = create_app("Sales").to_json() else {
            panic!("serialization failed");
        };
        assert_eq!(
            json,
            r#"{"jsonrpc":"2.0","method":"CreateApp","handle":-1,"params":["Sales"]}"#
        );

        let Ok(json) = get_script(1).to_json() else {
            panic!("serialization failed");
        };
        assert_eq!(
            json,
            r#"{"jsonrpc":"2.0","id":2,"method":"GetScript","handle":1,"params":[]}"#
        );
    }

    #[test]
    fn wire_form_round_trips_method_handle_params() {
        let commands = [
            open_doc("Sales.qvf", "DIR", "alice"),
            set_script(7, "LOAD * INLINE [a\n1];"),
            create_sheet(3, SheetParams::new("T", "D", "", "SH02", 2, 3, 4)),
            create_sheet_ex(3, SheetParamsEx::new("Title", "Desc", "SH01")),
            get_active_doc(),
        ];
        for command in commands {
            let Ok(json) = command.to_json() else {
                panic!("serialization failed");
            };
            let Ok(decoded) = serde_json::from_str::<Command>(&json) else {
                panic!("decode failed for {json}");
            };
            assert_eq!(decoded.method, command.method);
            assert_eq!(decoded.handle, command.handle);
            assert_eq!(decoded.params, command.params);
            assert_eq!(decoded, command);
        }
    }
}
