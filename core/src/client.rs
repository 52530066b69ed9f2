//! `RestDataAccess`: one operation in, one normalized result out.
//!
//! # Design
//! `execute` is a single synchronous round trip: build the request, hand it
//! to the owned transport, classify the response. Building and
//! classification never touch the network, so validation failures are
//! reported before any I/O happens. The facade holds no mutable state; it can
//! be shared by reference across threads whenever its transport can.

use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::address::AddressMode;
use crate::classify::ResponseClassifier;
use crate::error::ConfigError;
use crate::request::RequestBuilder;
use crate::transport::Transport;
use crate::types::{Operation, OperationResult, Outcome};

/// Lifecycle state of a `RestDataAccess`.
///
/// A layer is ready as soon as it is constructed. `close` consumes it, so no
/// closed layer is ever observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Ready,
}

/// Translates abstract operations into HTTP calls against one addressing mode.
pub struct RestDataAccess<T: Transport> {
    builder: RequestBuilder,
    classifier: ResponseClassifier,
    transport: T,
}

impl<T: Transport> RestDataAccess<T> {
    pub fn new(address: AddressMode, transport: T) -> Self {
        let classifier = ResponseClassifier::new(address.locator_field());
        debug!(locator = address.locator_field().key(), "initialization complete");
        Self {
            builder: RequestBuilder::new(address),
            classifier,
            transport,
        }
    }

    /// Build from `protocol`/`host`/`port`/`path` parameters; an empty map
    /// selects dynamic addressing.
    pub fn from_params(params: &HashMap<String, String>, transport: T) -> Result<Self, ConfigError> {
        Ok(Self::new(AddressMode::from_params(params)?, transport))
    }

    /// A layer without a base address; every call must supply `uri`.
    pub fn dynamic(transport: T) -> Self {
        Self::new(AddressMode::Dynamic, transport)
    }

    pub fn address(&self) -> &AddressMode {
        self.builder.address()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> LayerState {
        LayerState::Ready
    }

    pub fn status(&self) -> &'static str {
        "Initialization complete"
    }

    pub fn execute(&self, operation: &Operation) -> OperationResult {
        let op_type = operation.op_type;

        let request = match self.builder.build(operation) {
            Ok(request) => request,
            Err(err) => {
                warn!(op = %op_type, error = %err, "operation rejected");
                return OperationResult::failure(op_type, Outcome::Failed, err.to_string());
            }
        };

        debug!(op = %op_type, method = %request.method, url = %request.url, "sending request");

        match self.transport.send(&request) {
            Ok(response) => self.classifier.classify(Some(&response), Some(operation)),
            Err(err) => {
                error!(op = %op_type, url = %request.url, error = %err, "transport failure");
                OperationResult::failure(op_type, Outcome::Error, err.to_string())
            }
        }
    }

    /// Tear the layer down, releasing the transport. Consuming `self` rules
    /// out any further `execute`.
    pub fn close(self) {
        debug!("closing REST data access");
        drop(self.transport);
    }
}
