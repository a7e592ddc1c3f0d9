//! Port contracts toward the upstream MCP SDK and the host platform.

mod host;
mod transport;
mod upstream;

pub use host::{
    ConfigSchemaRegistry, ConfigStore, ExtensionRegistry, HostContext, HostError, HostResult,
    HostToolDefinition, ToolGroup, ToolGroupRegistrar, ToolGroupUnregistrar, ToolHandler,
};
pub use transport::{ProcessTransport, StreamEndpoint, TransportHandle};
pub use upstream::{ClientInfo, McpClient, McpClientConnector, UpstreamError, UpstreamResult};

#[cfg(test)]
pub use upstream::MockMcpClient;
