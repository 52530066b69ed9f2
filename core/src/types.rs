//! Operation and result value objects exchanged with callers.
//!
//! # Design
//! An `Operation` is consumed by reference and never mutated; every call
//! produces a fresh `OperationResult`. Payloads stay as loosely-typed JSON
//! because their shape depends on the operation type and on whatever the
//! backend returns.
//!
//! The error flag is derived from the outcome through the constructors on
//! `OperationResult`, so the "everything except SUCCESS and a plain redirect
//! is an error" rule lives in one place.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload key holding a bare resource identifier (static addressing).
pub const UID: &str = "uid";
/// Payload key holding a path appended to the base address.
pub const PATH: &str = "path";
/// Payload key holding a complete resource address (dynamic addressing).
pub const URI: &str = "uri";
/// Payload key holding the JSON request body.
pub const DATA: &str = "data";
/// Payload key holding url-encoded form fields.
pub const FORM: &str = "form";
pub const COOKIES: &str = "cookies";
pub const HEADERS: &str = "headers";
pub const QUERY_PARAMS: &str = "queryParams";
/// Result payload key wrapping a bare JSON array response.
pub const RESULTS: &str = "results";

/// The abstract data operation requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Create,
    Read,
    Replace,
    Delete,
    Search,
    /// Only produced when the input itself was missing or malformed.
    Null,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Create => "CREATE",
            OperationType::Read => "READ",
            OperationType::Replace => "REPLACE",
            OperationType::Delete => "DELETE",
            OperationType::Search => "SEARCH",
            OperationType::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// Normalized outcome of an executed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    Warning,
    Failed,
    Error,
    NotExist,
    NotAuthorized,
}

/// A typed operation with its JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    #[serde(default)]
    pub payload: Value,
}

impl Operation {
    pub fn new(op_type: OperationType, payload: Value) -> Self {
        Self { op_type, payload }
    }

    /// The payload as a JSON object, or `None` when it is absent or not an object.
    pub fn object(&self) -> Option<&Map<String, Value>> {
        self.payload.as_object()
    }
}

/// The normalized answer to an `Operation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub outcome: Outcome,
    pub error: bool,
    pub status: String,
    pub payload: Map<String, Value>,
}

impl OperationResult {
    pub fn success(op_type: OperationType, status: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            op_type,
            outcome: Outcome::Success,
            error: false,
            status: status.into(),
            payload,
        }
    }

    /// A 302 surfaced to the caller. Not an error: the caller decides whether to follow it.
    pub fn redirect(op_type: OperationType, status: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            op_type,
            outcome: Outcome::Warning,
            error: false,
            status: status.into(),
            payload,
        }
    }

    /// A warning that still counts as an error, e.g. a created resource whose
    /// response entity could not be parsed.
    pub fn degraded(op_type: OperationType, status: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            op_type,
            outcome: Outcome::Warning,
            error: true,
            status: status.into(),
            payload,
        }
    }

    /// Any non-success outcome, with an empty payload.
    pub fn failure(op_type: OperationType, outcome: Outcome, status: impl Into<String>) -> Self {
        Self {
            op_type,
            outcome,
            error: true,
            status: status.into(),
            payload: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Render a scalar JSON value as a request string.
///
/// Strings are used verbatim, numbers and booleans by their JSON text.
/// Null, arrays, objects and empty strings yield `None` and are skipped by
/// callers.
pub fn scalar_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Iterate the non-empty scalar entries of the object stored under `key`.
pub fn string_entries<'a>(
    payload: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = (&'a str, String)> + 'a {
    payload
        .get(key)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|map| map.iter())
        .filter(|(name, _)| !name.is_empty())
        .filter_map(|(name, value)| scalar_string(value).map(|v| (name.as_str(), v)))
}
