//! Operation-to-HTTP translation layer.
//!
//! # Overview
//! Callers hand an abstract `Operation` (CREATE, READ, REPLACE, DELETE,
//! SEARCH) with a JSON payload to `RestDataAccess::execute` and always get
//! back an `OperationResult` with a normalized `Outcome`, a diagnostic
//! message, and a JSON payload. Raw HTTP details never leak to the caller.
//!
//! # Design
//! - `RequestBuilder` produces a plain-data `HttpRequest`;
//!   `ResponseClassifier` consumes a plain-data `HttpResponse`. Neither does
//!   I/O.
//! - A `Transport` (by default `UreqTransport`) is the only network seam and
//!   is owned by the layer for its whole lifetime.
//! - `AddressMode` fixes, at construction, whether targets come from a base
//!   address or from a per-call `uri`.
//! - No retries, caching, or background work: one call, one round trip.

pub mod address;
pub mod classify;
pub mod client;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;

pub use address::{AddressMode, BaseAddress, LocatorField};
pub use classify::ResponseClassifier;
pub use client::{LayerState, RestDataAccess};
pub use error::{ConfigError, RequestError, TransportError};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MediaType};
pub use request::RequestBuilder;
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use types::{Operation, OperationResult, OperationType, Outcome};
