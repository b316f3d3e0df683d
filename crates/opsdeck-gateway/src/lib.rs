//! API gateway boundary for the opsdeck state layer
//!
//! The store never talks to the network directly. It consumes the
//! [`ApiGateway`] trait, which:
//! - issues a request against a fixed base URL with a fixed timeout,
//! - normalizes every failure into the uniform [`GatewayError`] shape,
//! - on success returns only the response payload, no transport envelope.
//!
//! [`HttpGateway`] is the production implementation. Test suites substitute
//! a scripted fake over the same trait.

pub mod error;
pub mod http;

pub use error::GatewayError;
pub use http::HttpGateway;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// HTTP method subset the backend endpoints use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        };
        write!(f, "{name}")
    }
}

/// Request boundary consumed by every store module
///
/// Implementations must resolve to either the bare response payload or a
/// [`GatewayError`]; no partial or transport-specific failure shapes may
/// leak through this seam.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Issue a request and return the decoded response payload.
    ///
    /// Endpoints that return no meaningful body (command acks, persists)
    /// resolve to [`Value::Null`].
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, GatewayError>;

    /// Fetch a binary artifact (e.g. an exported report).
    async fn request_bytes(&self, method: Method, path: &str) -> Result<Bytes, GatewayError>;
}
