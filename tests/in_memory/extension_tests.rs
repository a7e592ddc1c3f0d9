//! Runtime connect and disconnect through the published `mcp` extension.

use std::sync::Arc;

use super::helpers::{http_server, numbered_tools, server_name, stdio_server};
use mcp_a2a_bridge::bridge::{
    adapters::memory::{InMemoryMcpConnector, InMemoryToolHost},
    domain::BridgeConfig,
    services::{ExtensionError, McpBridgePlugin, McpExtension},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;

struct ExtensionContext {
    connector: Arc<InMemoryMcpConnector>,
    host: Arc<InMemoryToolHost>,
    extension: Arc<dyn McpExtension>,
    _plugin: McpBridgePlugin<InMemoryMcpConnector, DefaultClock>,
}

#[fixture]
async fn context() -> ExtensionContext {
    let connector = Arc::new(InMemoryMcpConnector::new());
    let host = Arc::new(InMemoryToolHost::with_config(json!({"refreshSeconds": 30})));
    let mut plugin = McpBridgePlugin::new(connector.clone(), Arc::new(DefaultClock));
    plugin.init(host.context()).await;
    let extension = host
        .extension(McpBridgePlugin::<InMemoryMcpConnector, DefaultClock>::EXTENSION_NAME)
        .expect("extension should be published");
    ExtensionContext {
        connector,
        host,
        extension,
        _plugin: plugin,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn runtime_connect_is_listed_and_persisted(#[future] context: ExtensionContext) {
    let bridge = context.await;
    let server = stdio_server("notes");
    bridge
        .connector
        .set_tool_catalog(server.name(), numbered_tools(4));

    let summary = bridge
        .extension
        .connect(server.clone())
        .await
        .expect("connect should succeed");

    assert_eq!(summary.tool_count, 4);
    assert_eq!(bridge.extension.list_servers(), vec![summary]);
    let stored = bridge.host.stored_config().expect("config should be saved");
    assert_eq!(stored["refreshSeconds"], 30);
    let loaded = BridgeConfig::load(Some(&stored)).expect("stored config should load");
    assert_eq!(loaded.config.servers, vec![server]);
    assert!(loaded.rejected.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconnect_with_new_transport_replaces_persisted_entry(
    #[future] context: ExtensionContext,
) {
    let bridge = context.await;
    bridge
        .extension
        .connect(stdio_server("search"))
        .await
        .expect("first connect should succeed");

    bridge
        .extension
        .connect(http_server("search"))
        .await
        .expect("reconnect should succeed");

    let stored = bridge.host.stored_config().expect("config should be saved");
    let loaded = BridgeConfig::load(Some(&stored)).expect("stored config should load");
    assert_eq!(loaded.config.servers, vec![http_server("search")]);
    assert_eq!(bridge.extension.list_servers().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disconnect_withdraws_tools_and_persists_removal(#[future] context: ExtensionContext) {
    let bridge = context.await;
    let server = stdio_server("notes");
    bridge
        .extension
        .connect(server.clone())
        .await
        .expect("connect should succeed");

    bridge
        .extension
        .disconnect(server.name())
        .await
        .expect("disconnect should succeed");

    assert!(bridge.extension.list_servers().is_empty());
    assert_eq!(bridge.host.unregistrations(), vec![server.group_name()]);
    assert_eq!(
        bridge.host.stored_config(),
        Some(json!({"refreshSeconds": 30, "servers": []}))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connect_failure_is_returned_to_caller(#[future] context: ExtensionContext) {
    let bridge = context.await;
    let server = stdio_server("broken");
    bridge
        .connector
        .fail_list_tools(server.name(), "method not found");

    let result = bridge.extension.connect(server).await;

    let Err(ExtensionError::Connection(err)) = &result else {
        panic!("expected a connection error, got {result:?}");
    };
    assert_eq!(err.server(), &server_name("broken"));
    assert!(bridge.extension.list_servers().is_empty());
    assert!(bridge.host.saved_configs().is_empty());
}
