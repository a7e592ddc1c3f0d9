//! Shared fixtures for in-memory bridge integration tests.

use std::sync::Arc;

use mcp_a2a_bridge::bridge::{
    adapters::memory::{InMemoryMcpConnector, InMemoryToolHost},
    domain::{ServerDescriptor, ServerName, UpstreamTool},
    services::ConnectionRegistry,
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};

/// Registry type wired to the in-memory adapters.
pub type TestRegistry = ConnectionRegistry<InMemoryMcpConnector, DefaultClock>;

/// In-memory host, scripted upstream servers and a registry joining them.
pub struct BridgeHarness {
    /// Scripted upstream servers.
    pub connector: Arc<InMemoryMcpConnector>,
    /// Recording host.
    pub host: Arc<InMemoryToolHost>,
    /// Registry under test.
    pub registry: TestRegistry,
}

/// Provides a registry whose host exposes every capability.
#[fixture]
pub fn harness() -> BridgeHarness {
    let connector = Arc::new(InMemoryMcpConnector::new());
    let host = Arc::new(InMemoryToolHost::new());
    let registry =
        ConnectionRegistry::new(connector.clone(), &host.context(), Arc::new(DefaultClock));
    BridgeHarness {
        connector,
        host,
        registry,
    }
}

/// Parses a descriptor from its configuration form.
///
/// # Panics
///
/// Panics when `value` is not a valid descriptor.
#[must_use]
pub fn descriptor(value: Value) -> ServerDescriptor {
    ServerDescriptor::from_value(value).expect("test descriptor should be valid")
}

/// Returns a subprocess descriptor named `name`.
#[must_use]
pub fn stdio_server(name: &str) -> ServerDescriptor {
    descriptor(json!({"name": name, "kind": "stdio", "cmd": "npx", "args": ["-y", name]}))
}

/// Returns a streamable HTTP descriptor named `name`.
#[must_use]
pub fn http_server(name: &str) -> ServerDescriptor {
    descriptor(json!({
        "name": name,
        "kind": "http",
        "url": format!("https://{name}.example.com/mcp")
    }))
}

/// Parses a server name.
///
/// # Panics
///
/// Panics when `name` is not a valid server name.
#[must_use]
pub fn server_name(name: &str) -> ServerName {
    ServerName::new(name).expect("test server name should be valid")
}

/// Returns `count` tools named `tool0`, `tool1`, ... in order.
#[must_use]
pub fn numbered_tools(count: usize) -> Vec<UpstreamTool> {
    (0..count)
        .map(|index| UpstreamTool::new(format!("tool{index}")))
        .collect()
}
