//! Plugin start-up and shutdown against a configured host.

use std::sync::Arc;

use super::helpers::{http_server, numbered_tools, server_name};
use mcp_a2a_bridge::bridge::{
    adapters::memory::{InMemoryMcpConnector, InMemoryToolHost},
    services::{ExtensionError, McpBridgePlugin},
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;

type TestPlugin = McpBridgePlugin<InMemoryMcpConnector, DefaultClock>;

fn configured_host() -> Arc<InMemoryToolHost> {
    Arc::new(InMemoryToolHost::with_config(json!({
        "servers": [
            {"name": "gmail", "kind": "stdio", "cmd": "npx", "args": ["-y", "gmail-mcp"]},
            {"name": "bad.name", "kind": "stdio", "cmd": "npx"},
            {"name": "search", "kind": "sse", "url": "https://search.example.com/sse"},
            {"name": "docs", "kind": "http", "url": "ftp://docs.example.com"},
            {"name": "calendar", "kind": "http", "url": "https://calendar.example.com/mcp"},
            {"name": "weather", "kind": "websocket", "url": "wss://weather.example.com"}
        ]
    })))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn init_connects_valid_servers_and_reports_the_rest() {
    let host = configured_host();
    let connector = Arc::new(InMemoryMcpConnector::new());
    connector.set_tool_catalog(&server_name("gmail"), numbered_tools(2));
    connector.fail_handshake(&server_name("search"), "connection refused");
    let mut plugin = TestPlugin::new(connector.clone(), Arc::new(DefaultClock));

    let report = plugin.init(host.context()).await;

    assert_eq!(
        report.connected,
        vec![server_name("gmail"), server_name("calendar")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, server_name("search"));
    assert!(report.failed[0].error.contains("connection refused"));
    let rejected: Vec<usize> = report.rejected.iter().map(|entry| entry.index).collect();
    assert_eq!(rejected, [1, 3, 5]);
    assert_eq!(report.rejected[2].name.as_deref(), Some("weather"));

    let registry = plugin.registry().expect("registry should exist");
    let listed: Vec<String> = registry
        .list_servers()
        .into_iter()
        .map(|summary| summary.name.to_string())
        .collect();
    assert_eq!(listed, ["gmail", "calendar"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_disconnects_every_server() {
    let host = configured_host();
    let connector = Arc::new(InMemoryMcpConnector::new());
    let mut plugin = TestPlugin::new(connector.clone(), Arc::new(DefaultClock));
    plugin.init(host.context()).await;

    plugin.shutdown().await;

    assert!(plugin.registry().is_none());
    assert_eq!(connector.close_count(&server_name("gmail")), 1);
    assert_eq!(connector.close_count(&server_name("calendar")), 1);
    assert_eq!(host.unregistrations().len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reinitialising_releases_previous_connections() {
    let host = configured_host();
    let connector = Arc::new(InMemoryMcpConnector::new());
    let mut plugin = TestPlugin::new(connector.clone(), Arc::new(DefaultClock));
    plugin.init(host.context()).await;

    let report = plugin.init(host.context()).await;

    assert_eq!(report.connected.len(), 3);
    assert_eq!(connector.close_count(&server_name("gmail")), 1);
    assert_eq!(connector.handshake_count(&server_name("gmail")), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_refuses_connect_after_shutdown() {
    let host = configured_host();
    let connector = Arc::new(InMemoryMcpConnector::new());
    let mut plugin = TestPlugin::new(connector.clone(), Arc::new(DefaultClock));
    plugin.init(host.context()).await;
    let extension = host
        .extension(TestPlugin::EXTENSION_NAME)
        .expect("extension should be published");
    plugin.shutdown().await;
    let registrations = host.registrations().len();

    let result = extension.connect(http_server("late")).await;

    assert!(matches!(result, Err(ExtensionError::ShutDown)));
    assert_eq!(connector.handshake_count(&server_name("late")), 0);
    assert_eq!(host.registrations().len(), registrations);
    assert!(extension.list_servers().is_empty());
}
