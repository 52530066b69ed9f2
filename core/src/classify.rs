//! Response classifier: maps (operation, status code, body) to an `OperationResult`.
//!
//! # Design
//! The mapping is a static rule table keyed by operation category and exact
//! status code. Anything not in the table falls through to a single default
//! rule (ERROR). The classifier keeps no state between calls and never
//! returns `Err`: parse and locator failures degrade the outcome instead.

use serde_json::{Map, Value};
use tracing::{debug, error};
use ureq::http::Uri;

use crate::address::LocatorField;
use crate::http::HttpResponse;
use crate::types::{Operation, OperationResult, OperationType, Outcome, HEADERS, RESULTS};

/// Rendered in messages in place of an empty response body.
pub const NO_CONTENT: &str = "(null)";

/// Operation types grouped by how their responses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Create,
    Read,
    Replace,
    Delete,
}

impl Category {
    fn of(op_type: OperationType) -> Option<Self> {
        match op_type {
            OperationType::Create => Some(Category::Create),
            OperationType::Read | OperationType::Search => Some(Category::Read),
            OperationType::Replace => Some(Category::Replace),
            OperationType::Delete => Some(Category::Delete),
            OperationType::Null => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// CREATE accepted: parse the body and attach the locator.
    Created { locator_required: bool },
    /// READ/SEARCH found: the parsed body is the payload.
    Found,
    Replaced,
    /// REPLACE created a new resource; the locator is mandatory.
    ReplaceCreated,
    Deleted,
    /// 302: surface the response headers instead of following.
    Redirect,
    Fail(Outcome, &'static str),
}

const DEFAULT_RULE: Rule = Rule::Fail(Outcome::Error, "Default Response");

#[rustfmt::skip]
const RULES: &[(Category, u16, Rule)] = &[
    (Category::Create,  200, Rule::Created { locator_required: false }),
    (Category::Create,  201, Rule::Created { locator_required: true }),
    (Category::Create,  302, Rule::Redirect),
    (Category::Create,  400, Rule::Fail(Outcome::Failed, "BAD REQUEST")),
    (Category::Create,  403, Rule::Fail(Outcome::Failed, "Forbidden create")),
    (Category::Create,  404, Rule::Fail(Outcome::NotExist, "NOT FOUND")),

    (Category::Read,    200, Rule::Found),
    (Category::Read,    400, Rule::Fail(Outcome::Failed, "BAD REQUEST")),
    (Category::Read,    401, Rule::Fail(Outcome::NotAuthorized, "UNAUTHORIZED")),
    (Category::Read,    403, Rule::Fail(Outcome::Failed, "Forbidden read/search")),
    (Category::Read,    404, Rule::Fail(Outcome::NotExist, "NOT FOUND")),

    (Category::Replace, 200, Rule::Replaced),
    (Category::Replace, 201, Rule::ReplaceCreated),
    (Category::Replace, 204, Rule::Replaced),
    (Category::Replace, 400, Rule::Fail(Outcome::Failed, "BAD REQUEST")),
    (Category::Replace, 403, Rule::Fail(Outcome::Failed, "Forbidden replace")),
    (Category::Replace, 404, Rule::Fail(Outcome::NotExist, "NOT FOUND")),

    (Category::Delete,  200, Rule::Deleted),
    (Category::Delete,  204, Rule::Deleted),
    (Category::Delete,  400, Rule::Fail(Outcome::Failed, "BAD REQUEST")),
    (Category::Delete,  403, Rule::Fail(Outcome::Failed, "Forbidden delete")),
    (Category::Delete,  404, Rule::Fail(Outcome::NotExist, "NOT FOUND")),
];

fn lookup(category: Category, status: u16) -> Rule {
    RULES
        .iter()
        .find(|(c, s, _)| *c == category && *s == status)
        .map(|(_, _, rule)| *rule)
        .unwrap_or(DEFAULT_RULE)
}

/// Stateless classifier bound to the locator field of an addressing mode.
#[derive(Debug, Clone, Copy)]
pub struct ResponseClassifier {
    locator: LocatorField,
}

impl ResponseClassifier {
    pub fn new(locator: LocatorField) -> Self {
        Self { locator }
    }

    /// Classify `response` as the answer to `operation`.
    ///
    /// A missing response or operation indicates a bug in the calling layer
    /// and yields an ERROR result typed `NULL`.
    pub fn classify(&self, response: Option<&HttpResponse>, operation: Option<&Operation>) -> OperationResult {
        let Some(response) = response else {
            error!("input response is null");
            return OperationResult::failure(OperationType::Null, Outcome::Error, "classify: input response is null");
        };
        let Some(operation) = operation else {
            error!("input operation is null");
            return OperationResult::failure(OperationType::Null, Outcome::Error, "classify: input operation is null");
        };

        let op_type = operation.op_type;
        let result = match Category::of(op_type) {
            Some(category) => self.apply(op_type, lookup(category, response.status), response),
            None => OperationResult::failure(
                op_type,
                Outcome::Failed,
                format!("Operation type not supported: {op_type}"),
            ),
        };

        debug!(
            op = %op_type,
            status = response.status,
            outcome = ?result.outcome,
            message = %result.status,
            "classified response"
        );
        result
    }

    fn apply(&self, op_type: OperationType, rule: Rule, response: &HttpResponse) -> OperationResult {
        let entity = (!response.body.is_empty()).then_some(response.body.as_str());

        match rule {
            Rule::Created { locator_required } => {
                let (mut payload, parse_failed) = match entity.map(parse_entity) {
                    Some(Ok(map)) => (map, false),
                    Some(Err(_)) => (Map::new(), true),
                    None => (Map::new(), false),
                };
                match self.locator(response, locator_required) {
                    Ok(Some(locator)) => {
                        payload.insert(self.locator.key().to_string(), Value::String(locator));
                    }
                    Ok(None) => {}
                    Err(message) => {
                        return OperationResult::failure(
                            op_type,
                            Outcome::Error,
                            format!("{message}: {}", diagnostic(response, entity)),
                        )
                    }
                }
                match (parse_failed, entity) {
                    (true, Some(raw)) => OperationResult::degraded(op_type, raw, payload),
                    _ => OperationResult::success(op_type, format!("Response: {}", response.reason), payload),
                }
            }
            Rule::Found => match entity.map(parse_entity).transpose() {
                Ok(payload) => OperationResult::success(op_type, "Found document", payload.unwrap_or_default()),
                Err(err) => OperationResult::failure(
                    op_type,
                    Outcome::Error,
                    format!("Could not parse response entity: {err}: {}", diagnostic(response, entity)),
                ),
            },
            Rule::Replaced => OperationResult::success(op_type, "Replaced document", Map::new()),
            Rule::ReplaceCreated => match self.locator(response, true) {
                Ok(locator) => {
                    let mut payload = Map::new();
                    if let Some(locator) = locator {
                        payload.insert(self.locator.key().to_string(), Value::String(locator));
                    }
                    OperationResult::success(op_type, "Created document", payload)
                }
                Err(message) => OperationResult::failure(
                    op_type,
                    Outcome::Error,
                    format!("{message}: {}", diagnostic(response, entity)),
                ),
            },
            Rule::Deleted => OperationResult::success(op_type, "Deleted document", Map::new()),
            Rule::Redirect => {
                let mut headers = Map::new();
                for (name, value) in response.headers.iter().filter(|(n, v)| !n.is_empty() && !v.is_empty()) {
                    let joined = match headers.get(name).and_then(Value::as_str) {
                        Some(previous) => format!("{previous},{value}"),
                        None => value.clone(),
                    };
                    headers.insert(name.clone(), Value::String(joined));
                }
                let mut payload = Map::new();
                payload.insert(HEADERS.to_string(), Value::Object(headers));
                OperationResult::redirect(
                    op_type,
                    format!("Redirect: {}, {}", response.status, response.reason),
                    payload,
                )
            }
            Rule::Fail(outcome, label) => {
                OperationResult::failure(op_type, outcome, format!("{label}: {}", diagnostic(response, entity)))
            }
        }
    }

    /// Extract the created-resource locator from the `Location` header.
    ///
    /// `Ok(None)` only when the header is absent and `required` is false.
    fn locator(&self, response: &HttpResponse, required: bool) -> Result<Option<String>, String> {
        let key = self.locator.key();
        let location = match response.header("Location").filter(|l| !l.is_empty()) {
            Some(location) => location,
            None if required => return Err(format!("Could not get {key} from response: no Location header")),
            None => return Ok(None),
        };
        match self.locator {
            LocatorField::Uri => Ok(Some(location.to_string())),
            LocatorField::Uid => {
                let uri: Uri = location
                    .parse()
                    .map_err(|err| format!("Could not get {key} from response: {err}"))?;
                let uid = uri.path().split('/').rfind(|s| !s.is_empty());
                match uid {
                    Some(uid) => Ok(Some(uid.to_string())),
                    None if required => Err(format!(
                        "Could not get {key} from response: Location '{location}' has no path segment"
                    )),
                    None => Ok(None),
                }
            }
        }
    }
}

/// Status code, reason phrase and raw entity, carried by every failure message.
fn diagnostic(response: &HttpResponse, entity: Option<&str>) -> String {
    format!(
        "{}, {}, Entity='{}'",
        response.status,
        response.reason,
        entity.unwrap_or(NO_CONTENT)
    )
}

/// Parse a response entity into a JSON object. A bare array is wrapped
/// under `results`.
fn parse_entity(entity: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(entity).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert(RESULTS.to_string(), Value::Array(items));
            Ok(map)
        }
        other => Err(format!("Parsed entity is not an object or array: {other}")),
    }
}
