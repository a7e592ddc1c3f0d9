//! Domain model for bridged MCP servers.
//!
//! The bridge domain models server identity, transport configuration, the
//! persisted configuration surface, and the tool shapes exchanged between the
//! upstream and host protocols. Infrastructure concerns remain outside this
//! boundary.

mod config;
mod descriptor;
mod error;
mod ids;
mod summary;
mod tool;
mod transport;

pub use config::{
    BridgeConfig, BridgeConfigError, ConfigField, ConfigSchema, LoadedConfig, RejectedServer,
    with_server_removed, with_server_upserted,
};
pub use descriptor::ServerDescriptor;
pub use error::ToolRegistryDomainError;
pub use ids::{ConnectionId, NAMESPACE_SEPARATOR, NamespacedToolName, ServerName, ToolGroupName};
pub use summary::ServerSummary;
pub use tool::{ContentBlock, ToolResult, UpstreamCallResult, UpstreamTool};
pub use transport::{McpTransport, StdioTransportConfig, StreamTransportConfig, TransportKind};
