//! Application services: adapter generation, connection lifecycle, the
//! extension facade and the host binding.

mod adapter;
mod extension;
mod plugin;
mod registry;

pub use adapter::{
    ForwardingToolHandler, TOOL_GROUP_VERSION, ToolAdapterGenerator, normalize_result,
};
pub use extension::{BridgeExtension, ExtensionError, ExtensionResult, McpExtension};
pub use plugin::{FailedServer, InitReport, McpBridgePlugin};
pub use registry::{CLIENT_VERSION, ConnectionError, ConnectionRegistry, ConnectionResult};
