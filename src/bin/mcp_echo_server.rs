//! Minimal MCP server speaking newline-delimited JSON-RPC over stdio.
//!
//! Usage:
//!
//! ```text
//! mcp_echo_server
//! ```
//!
//! The server exposes a single `echo` tool returning its `text` argument as a
//! text content block. Calls without a string `text` argument produce an
//! error result. It exists so the stdio transport can be exercised end to end
//! without an external MCP installation.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const PROTOCOL_VERSION: &str = "2025-03-26";
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Ok(message) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        // Notifications carry no id and get no reply.
        let Some(id) = message.get("id").cloned() else {
            continue;
        };
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let params = message.get("params").cloned().unwrap_or(Value::Null);

        let reply = match respond(method, &params) {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, text)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": text}
            }),
        };
        let mut frame = reply.to_string();
        frame.push('\n');
        stdout.write_all(frame.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn respond(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "initialize" => {
            let version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);
            Ok(json!({
                "protocolVersion": version,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "mcp-echo-server", "version": env!("CARGO_PKG_VERSION")}
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({
            "tools": [{
                "name": "echo",
                "description": "Echoes the text argument",
                "inputSchema": {
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }
            }]
        })),
        "tools/call" => call(params),
        other => Err((METHOD_NOT_FOUND, format!("method not found: {other}"))),
    }
}

fn call(params: &Value) -> Result<Value, (i64, String)> {
    let tool = params.get("name").and_then(Value::as_str).unwrap_or_default();
    if tool != "echo" {
        return Err((INVALID_PARAMS, format!("unknown tool: {tool}")));
    }
    let text = params
        .get("arguments")
        .and_then(|arguments| arguments.get("text"))
        .and_then(Value::as_str);
    Ok(text.map_or_else(
        || json!({"content": [{"type": "text", "text": "missing text argument"}], "isError": true}),
        |echoed| json!({"content": [{"type": "text", "text": echoed}]}),
    ))
}
