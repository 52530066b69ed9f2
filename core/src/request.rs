//! Request builder: turns an `Operation` into an `HttpRequest`.
//!
//! Nothing here performs I/O. Every validation failure is returned as a
//! `RequestError` before a transport is ever involved.

use serde_json::{Map, Value};
use tracing::debug;

use crate::address::AddressMode;
use crate::error::RequestError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, MediaType};
use crate::types::{string_entries, Operation, OperationType, COOKIES, DATA, FORM, HEADERS, QUERY_PARAMS};

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";

/// Builds requests against one addressing mode.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    address: AddressMode,
}

impl RequestBuilder {
    pub fn new(address: AddressMode) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &AddressMode {
        &self.address
    }

    pub fn build(&self, operation: &Operation) -> Result<HttpRequest, RequestError> {
        let op_type = operation.op_type;
        if op_type == OperationType::Null {
            return Err(RequestError::UnsupportedOperation(op_type));
        }
        let payload = operation.object().ok_or(RequestError::MissingPayload)?;
        let url = self.address.resolve(payload)?;

        let query = owned_entries(payload, QUERY_PARAMS);
        let cookies = owned_entries(payload, COOKIES);

        let mut accept = None;
        let mut content_type = None;
        let mut headers = Vec::new();
        for (name, value) in string_entries(payload, HEADERS) {
            if name.eq_ignore_ascii_case(ACCEPT) {
                accept = MediaType::parse(&value);
            } else if name.eq_ignore_ascii_case(CONTENT_TYPE) {
                content_type = BodyEncoding::parse(&value);
            } else {
                headers.push((name.to_string(), value));
            }
        }
        let accept = accept.unwrap_or(MediaType::Json);
        let encoding = content_type.unwrap_or(BodyEncoding::Json);
        let content_type = encoding.media_type();

        let (method, body) = match op_type {
            OperationType::Create => (HttpMethod::Post, Some(entity(op_type, payload, encoding, false)?)),
            OperationType::Replace => (HttpMethod::Put, Some(entity(op_type, payload, encoding, true)?)),
            OperationType::Read | OperationType::Search => (HttpMethod::Get, None),
            OperationType::Delete => (HttpMethod::Delete, None),
            OperationType::Null => return Err(RequestError::UnsupportedOperation(op_type)),
        };

        debug!(%method, %url, %accept, %content_type, "built request");

        Ok(HttpRequest {
            method,
            url,
            query,
            headers,
            cookies,
            accept,
            content_type,
            body,
        })
    }
}

/// Request entity encodings selectable through `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEncoding {
    Json,
    Form,
}

impl BodyEncoding {
    fn parse(value: &str) -> Option<Self> {
        match MediaType::parse(value)? {
            MediaType::Json => Some(BodyEncoding::Json),
            MediaType::FormUrlEncoded => Some(BodyEncoding::Form),
            MediaType::Wildcard => None,
        }
    }

    fn media_type(self) -> MediaType {
        match self {
            BodyEncoding::Json => MediaType::Json,
            BodyEncoding::Form => MediaType::FormUrlEncoded,
        }
    }
}

fn owned_entries(payload: &Map<String, Value>, key: &str) -> Vec<(String, String)> {
    string_entries(payload, key)
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Encode the request entity for CREATE (`require_data = false`) or
/// REPLACE (`require_data = true`, JSON body must be non-empty).
fn entity(
    op_type: OperationType,
    payload: &Map<String, Value>,
    encoding: BodyEncoding,
    require_data: bool,
) -> Result<HttpBody, RequestError> {
    match encoding {
        BodyEncoding::Json => {
            let data = payload
                .get(DATA)
                .and_then(Value::as_object)
                .ok_or(RequestError::MissingData(op_type))?;
            if require_data && data.is_empty() {
                return Err(RequestError::EmptyData(op_type));
            }
            Ok(HttpBody::Json(Value::Object(data.clone()).to_string()))
        }
        BodyEncoding::Form => {
            let form = payload
                .get(FORM)
                .and_then(Value::as_object)
                .ok_or(RequestError::MissingForm(op_type))?;
            if form.is_empty() {
                return Err(RequestError::EmptyForm(op_type));
            }
            Ok(HttpBody::Form(owned_entries(payload, FORM)))
        }
    }
}
