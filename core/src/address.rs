//! Target address resolution.
//!
//! # Design
//! A layer instance either owns a fixed base address or expects every call
//! to name its own `uri`. The choice is made once at construction and is
//! matched exhaustively here, so no other module checks the mode. The mode
//! also decides how a created-resource locator is reported back: a bare
//! `uid` under a base address, the full `uri` otherwise.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{ConfigError, RequestError};
use crate::types::{scalar_string, PATH, UID, URI};

pub const PARAM_PROTOCOL: &str = "protocol";
pub const PARAM_HOST: &str = "host";
pub const PARAM_PORT: &str = "port";
pub const PARAM_PATH: &str = "path";

/// Fixed protocol, host, port and base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseAddress {
    pub protocol: String,
    pub host: String,
    pub port: String,
    pub path: String,
}

impl BaseAddress {
    pub fn new(protocol: &str, host: &str, port: &str, path: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            protocol: non_empty(PARAM_PROTOCOL, Some(protocol))?,
            host: non_empty(PARAM_HOST, Some(host))?,
            port: non_empty(PARAM_PORT, Some(port))?,
            path: non_empty(PARAM_PATH, Some(path))?,
        })
    }

    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| non_empty(name, params.get(name).map(String::as_str));
        Ok(Self {
            protocol: get(PARAM_PROTOCOL)?,
            host: get(PARAM_HOST)?,
            port: get(PARAM_PORT)?,
            path: get(PARAM_PATH)?,
        })
    }

    /// `protocol://host:port/path`
    pub fn url(&self) -> String {
        join(&format!("{}://{}:{}", self.protocol, self.host, self.port), &self.path)
    }
}

fn non_empty(name: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingParam(name)),
    }
}

/// Result payload field used for a created-resource locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorField {
    /// Last path segment of the `Location` header, stored under `uid`.
    Uid,
    /// The `Location` header verbatim, stored under `uri`.
    Uri,
}

impl LocatorField {
    pub fn key(&self) -> &'static str {
        match self {
            LocatorField::Uid => UID,
            LocatorField::Uri => URI,
        }
    }
}

/// How request targets are addressed for the lifetime of a layer instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressMode {
    StaticBase(BaseAddress),
    Dynamic,
}

impl AddressMode {
    /// An empty parameter map selects dynamic addressing; anything else must
    /// be a complete base address.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        if params.is_empty() {
            return Ok(AddressMode::Dynamic);
        }
        BaseAddress::from_params(params).map(AddressMode::StaticBase)
    }

    pub fn locator_field(&self) -> LocatorField {
        match self {
            AddressMode::StaticBase(_) => LocatorField::Uid,
            AddressMode::Dynamic => LocatorField::Uri,
        }
    }

    /// Resolve the request URL (without query string) for one call.
    pub fn resolve(&self, payload: &Map<String, Value>) -> Result<String, RequestError> {
        let uri = payload.get(URI).and_then(Value::as_str).filter(|s| !s.is_empty());
        match self {
            AddressMode::StaticBase(base) => {
                if uri.is_some() {
                    return Err(RequestError::UnexpectedField(URI));
                }
                let mut url = base.url();
                if let Some(path) = payload.get(PATH).and_then(scalar_string) {
                    url = join(&url, &path);
                }
                if let Some(uid) = payload.get(UID).and_then(scalar_string) {
                    url = join(&url, &uid);
                }
                Ok(url)
            }
            AddressMode::Dynamic => uri.map(str::to_string).ok_or(RequestError::MissingField(URI)),
        }
    }
}

/// Append `segment` to `base` with exactly one `/` between them.
fn join(base: &str, segment: &str) -> String {
    let segment = segment.trim_matches('/');
    if segment.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), segment)
}
