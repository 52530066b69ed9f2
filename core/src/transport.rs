//! The only place where requests touch the network.
//!
//! # Design
//! `Transport` is the seam between the deterministic builder/classifier and
//! the HTTP client. `RestDataAccess` owns exactly one transport, created by
//! the caller and moved in at construction, so the connection pool lives as
//! long as the layer and is dropped once with it. Implementations must be
//! safe to share between threads because concurrent callers reuse the same
//! instance.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MediaType};

/// Executes a built request and returns the response as data.
///
/// Non-2xx statuses are responses, not errors. `Err` is reserved for
/// failures to obtain any response at all.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Settings for `UreqTransport`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Deadline for a whole request, in seconds. No deadline when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `Transport` backed by a ureq agent.
///
/// Redirects are never followed and HTTP error statuses are returned as
/// responses so the classifier sees every status code.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout_global(Some(Duration::from_secs(secs)));
        }
        Self {
            agent: builder.build().new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => decorate(self.agent.get(url), request).call(),
            HttpMethod::Delete => decorate(self.agent.delete(url), request).call(),
            HttpMethod::Post => send_entity(decorate(self.agent.post(url), request), request),
            HttpMethod::Put => send_entity(decorate(self.agent.put(url), request), request),
        };
        let mut response = result?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response.body_mut().read_to_vec()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Attach accept type, query parameters, pass-through headers and cookies.
fn decorate<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    builder = builder.header("Accept", request.accept.as_str());
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(cookie) = request.cookie_header() {
        builder = builder.header("Cookie", cookie);
    }
    builder
}

fn send_entity(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match &request.body {
        Some(HttpBody::Json(json)) => builder
            .content_type(MediaType::Json.as_str())
            .send(json.as_str()),
        Some(HttpBody::Form(fields)) => {
            builder.send_form(fields.iter().map(|(name, value)| (name.as_str(), value.as_str())))
        }
        None => builder.content_type(request.content_type.as_str()).send_empty(),
    }
}
