//! Error types for the REST data-access layer.
//!
//! # Design
//! Only `ConfigError` ever reaches a caller as `Err`: without a valid base
//! address no `RestDataAccess` can exist. `RequestError` and
//! `TransportError` are internal and are folded into an `OperationResult`
//! (FAILED and ERROR respectively) by `RestDataAccess::execute`.

use crate::types::OperationType;

/// Construction-time configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing or empty configuration parameter '{0}'")]
    MissingParam(&'static str),
}

/// Validation or request-building failure. No network call is made.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("JSON payload is missing or is not an object")]
    MissingPayload,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' is not allowed when a base address is configured")]
    UnexpectedField(&'static str),

    #[error("{0}: JSON input does not contain a 'data' object")]
    MissingData(OperationType),

    #[error("{0}: JSON 'data' is null or empty")]
    EmptyData(OperationType),

    #[error("{0}: JSON input does not contain a 'form' object")]
    MissingForm(OperationType),

    #[error("{0}: URL encoded form is null")]
    EmptyForm(OperationType),

    #[error("Unsupported operation '{0}'")]
    UnsupportedOperation(OperationType),
}

/// The underlying HTTP client failed to produce a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] ureq::Error),

    #[error("HTTP transport error: {0}")]
    Other(String),
}
