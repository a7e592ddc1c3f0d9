//! Connection registry behaviour against in-memory host and servers.

use super::helpers::{
    BridgeHarness, harness, http_server, numbered_tools, server_name, stdio_server,
};
use mcp_a2a_bridge::bridge::{
    domain::{ContentBlock, TransportKind, UpstreamCallResult, UpstreamTool},
    ports::TransportHandle,
    services::ConnectionError,
};
use rstest::rstest;
use serde_json::{Map, Value, json};

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connect_registers_one_namespaced_group_in_discovery_order(harness: BridgeHarness) {
    let server = stdio_server("gmail");
    harness.connector.set_tool_catalog(
        server.name(),
        vec![
            UpstreamTool::new("sendEmail").with_description("Send an email"),
            UpstreamTool::new("listEmails"),
            UpstreamTool::new("archive").with_input_schema(json!({
                "type": "object",
                "properties": {"id": {"type": "string"}}
            })),
        ],
    );

    let summary = harness
        .registry
        .connect(server.clone())
        .await
        .expect("connect should succeed");

    assert_eq!(summary.tool_count, 3);
    let registrations = harness.host.registrations();
    assert_eq!(registrations.len(), 1);
    let group = &registrations[0];
    assert_eq!(group.name.as_str(), "mcp-gmail");
    let names: Vec<&str> = group.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, ["gmail.sendEmail", "gmail.listEmails", "gmail.archive"]);
    assert_eq!(group.tools[0].description, "Send an email");
    assert_eq!(group.tools[1].description, "Tool listEmails from gmail");
    assert_eq!(
        group.tools[1].input_schema,
        json!({"type": "object", "properties": {}})
    );
    assert_eq!(group.tools[2].input_schema["properties"]["id"]["type"], "string");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adapter_forwards_exactly_one_call_with_original_name(harness: BridgeHarness) {
    let server = stdio_server("gmail");
    harness
        .connector
        .set_tool_catalog(server.name(), vec![UpstreamTool::new("sendEmail")]);
    harness.connector.set_call_result(
        server.name(),
        "sendEmail",
        UpstreamCallResult::new()
            .with_content(vec![ContentBlock::text("queued")])
            .with_is_error(json!("yes")),
    );
    harness
        .registry
        .connect(server.clone())
        .await
        .expect("connect should succeed");
    let args = arguments(json!({"to": "a@example.com", "subject": "hi"}));

    let tool = harness.host.registrations()[0].tools[0].clone();
    let result = tool.handler.call(args.clone()).await;

    let calls = harness.connector.calls(server.name());
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tool, "sendEmail");
    assert_eq!(calls[0].arguments, args);
    assert_eq!(result.content, vec![ContentBlock::text("queued")]);
    assert!(!result.is_error);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adapter_synthesizes_text_when_upstream_omits_content(harness: BridgeHarness) {
    let server = stdio_server("calc");
    harness
        .connector
        .set_tool_catalog(server.name(), vec![UpstreamTool::new("add")]);
    harness.connector.set_call_result(
        server.name(),
        "add",
        UpstreamCallResult::new()
            .with_is_error(json!(true))
            .with_field("value", json!(3)),
    );
    harness
        .registry
        .connect(server)
        .await
        .expect("connect should succeed");

    let tool = harness.host.registrations()[0].tools[0].clone();
    let result = tool.handler.call(Map::new()).await;

    assert!(result.is_error);
    assert_eq!(result.content.len(), 1);
    let text = result.content[0].as_text().expect("synthesized text block");
    let parsed: Value = serde_json::from_str(text).expect("text holds the raw result");
    assert_eq!(parsed["value"], 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adapter_reports_upstream_failure_as_error_result(harness: BridgeHarness) {
    let server = stdio_server("calc");
    harness
        .connector
        .set_tool_catalog(server.name(), vec![UpstreamTool::new("divide")]);
    harness
        .connector
        .fail_call(server.name(), "divide", "division by zero");
    harness
        .registry
        .connect(server)
        .await
        .expect("connect should succeed");

    let tool = harness.host.registrations()[0].tools[0].clone();
    let result = tool.handler.call(Map::new()).await;

    assert!(result.is_error);
    let text = result.content[0].as_text().expect("error text block");
    assert!(text.contains("division by zero"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconnect_closes_prior_client_and_registers_twice(harness: BridgeHarness) {
    let server = stdio_server("gmail");
    harness
        .connector
        .set_tool_catalog(server.name(), numbered_tools(2));

    harness
        .registry
        .connect(server.clone())
        .await
        .expect("first connect should succeed");
    harness
        .registry
        .connect(server.clone())
        .await
        .expect("reconnect should succeed");

    assert_eq!(harness.connector.close_count(server.name()), 1);
    assert_eq!(harness.connector.handshake_count(server.name()), 2);
    assert_eq!(harness.host.registration_count(&server.group_name()), 2);
    assert_eq!(harness.registry.list_servers().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disconnect_of_unknown_name_has_no_side_effects(harness: BridgeHarness) {
    let removed = harness.registry.disconnect(&server_name("ghost")).await;

    assert!(!removed);
    assert!(harness.host.unregistrations().is_empty());
    assert!(harness.connector.transports().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_reflects_connections_until_disconnect_all(harness: BridgeHarness) {
    let first = stdio_server("s1");
    let second = http_server("s2");
    harness
        .connector
        .set_tool_catalog(first.name(), numbered_tools(2));
    harness
        .connector
        .set_tool_catalog(second.name(), numbered_tools(3));
    harness
        .registry
        .connect(first)
        .await
        .expect("s1 should connect");
    harness
        .registry
        .connect(second)
        .await
        .expect("s2 should connect");

    let listed: Vec<(String, TransportKind, usize)> = harness
        .registry
        .list_servers()
        .into_iter()
        .map(|summary| (summary.name.to_string(), summary.kind, summary.tool_count))
        .collect();
    assert_eq!(
        listed,
        [
            ("s1".to_owned(), TransportKind::Stdio, 2),
            ("s2".to_owned(), TransportKind::Http, 3),
        ]
    );

    harness.registry.disconnect_all().await;

    assert!(harness.registry.list_servers().is_empty());
    assert_eq!(harness.host.unregistrations().len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_server_does_not_block_the_rest(harness: BridgeHarness) {
    let servers = [stdio_server("a"), stdio_server("b"), http_server("c")];
    harness
        .connector
        .fail_handshake(servers[1].name(), "spawn failed: npx not found");

    let mut failures = Vec::new();
    for server in servers {
        if let Err(err) = harness.registry.connect(server).await {
            failures.push(err);
        }
    }

    assert_eq!(harness.registry.list_servers().len(), 2);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], ConnectionError::Handshake { .. }));
    assert_eq!(failures[0].server().as_str(), "b");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stdio_transport_receives_only_benign_environment(harness: BridgeHarness) {
    let server = super::helpers::descriptor(json!({
        "name": "fs",
        "kind": "stdio",
        "cmd": "fs-mcp",
        "env": {"LD_PRELOAD": "/tmp/evil.so", "API_TOKEN": "secret"}
    }));

    harness
        .registry
        .connect(server)
        .await
        .expect("connect should succeed");

    let transports = harness.connector.transports();
    let [TransportHandle::Process(process)] = transports.as_slice() else {
        panic!("expected one process transport, got {transports:?}");
    };
    let env = process.env().expect("sanitized env should be present");
    assert_eq!(env.keys().collect::<Vec<_>>(), ["API_TOKEN"]);
}
