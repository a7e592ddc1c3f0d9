//! Upstream MCP SDK port: handshake, discovery, invocation and close.

use super::TransportHandle;
use crate::bridge::domain::{UpstreamCallResult, UpstreamTool};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Result type for upstream client operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Identity announced to upstream servers during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

impl ClientInfo {
    /// Creates client identity metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Connected MCP client session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McpClient: Send + Sync {
    /// Lists tools exposed by the server, in server order.
    async fn list_tools(&self) -> UpstreamResult<Vec<UpstreamTool>>;

    /// Invokes a tool by its upstream name.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> UpstreamResult<UpstreamCallResult>;

    /// Closes the session and releases the transport.
    async fn close(&self) -> UpstreamResult<()>;
}

/// Factory establishing client sessions over a transport.
#[async_trait]
pub trait McpClientConnector: Send + Sync {
    /// Connects over `transport` and completes the protocol handshake.
    async fn connect(
        &self,
        client_info: ClientInfo,
        transport: TransportHandle,
    ) -> UpstreamResult<Arc<dyn McpClient>>;
}

/// Errors returned by upstream client implementations.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The protocol handshake did not complete.
    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    /// The server answered with a protocol-level error.
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// The session has already been closed.
    #[error("MCP client is closed")]
    Closed,

    /// Transport or runtime failure.
    #[error("MCP client runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl UpstreamError {
    /// Wraps a transport or runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
