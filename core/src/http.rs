//! HTTP request and response descriptors for the host-does-IO pattern.
//!
//! # Design
//! The request builder produces an `HttpRequest` as plain data and the
//! classifier consumes an `HttpResponse` as plain data. Only a `Transport`
//! touches the network, which keeps building and classification
//! deterministic and lets tests swap in a recording transport.
//!
//! All fields use owned types so a descriptor can be logged, stored by a
//! test spy, or handed to another thread without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// Media types recognized in `Accept` and `Content-Type` payload headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    FormUrlEncoded,
    Wildcard,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::FormUrlEncoded => "application/x-www-form-urlencoded",
            MediaType::Wildcard => "*/*",
        }
    }

    /// Parse an exact media type string. Unrecognized values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "application/json" => Some(MediaType::Json),
            "application/x-www-form-urlencoded" => Some(MediaType::FormUrlEncoded),
            "*/*" => Some(MediaType::Wildcard),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded request entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    /// Serialized JSON document.
    Json(String),
    /// Form fields, url-encoded by the transport.
    Form(Vec<(String, String)>),
}

/// An HTTP request described as plain data.
///
/// `url` carries no query string; `query` pairs are appended by the
/// transport so that values are encoded in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub accept: MediaType,
    pub content_type: MediaType,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// Render cookies as a single `Cookie` header value, if any are set.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase for `status`, e.g. `Not Found`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/items".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            cookies: Vec::new(),
            accept: MediaType::Json,
            content_type: MediaType::Json,
            body: None,
        }
    }

    #[test]
    fn media_type_parse_is_exact() {
        assert_eq!(MediaType::parse("application/json"), Some(MediaType::Json));
        assert_eq!(
            MediaType::parse("application/x-www-form-urlencoded"),
            Some(MediaType::FormUrlEncoded)
        );
        assert_eq!(MediaType::parse("*/*"), Some(MediaType::Wildcard));
        assert_eq!(MediaType::parse("text/html"), None);
        assert_eq!(MediaType::parse("application/json; charset=utf-8"), None);
    }

    #[test]
    fn cookie_header_joins_pairs() {
        let mut req = request();
        assert_eq!(req.cookie_header(), None);
        req.cookies = vec![
            ("ssotoken".to_string(), "abc-123".to_string()),
            ("lang".to_string(), "en".to_string()),
        ];
        assert_eq!(req.cookie_header().as_deref(), Some("ssotoken=abc-123; lang=en"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers: vec![("location".to_string(), "http://h/items/1".to_string())],
            body: String::new(),
        };
        assert_eq!(resp.header("Location"), Some("http://h/items/1"));
        assert_eq!(resp.header("ETag"), None);
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
