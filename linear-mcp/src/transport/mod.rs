//! Backend transport
//!
//! The dispatch layer never talks HTTP directly: it hands a descriptor and a
//! bound variable map to a [`Transport`] and receives the response `data`
//! object, or a [`TransportError`].

pub mod graphql;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use crate::error::TransportError;
use crate::operations::OperationDescriptor;
pub use graphql::GraphqlTransport;

/// Execute a named operation with bound variables.
///
/// Implementations return the `data` object of the response. Network,
/// protocol and GraphQL-level errors are all reported as `TransportError`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        operation: &'static OperationDescriptor,
        variables: Map<String, Value>,
    ) -> Result<Value, TransportError>;
}
