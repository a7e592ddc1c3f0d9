//! Tool adapter generation: republishes upstream tools under namespaced names.

use crate::bridge::{
    domain::{
        ContentBlock, NamespacedToolName, ServerName, ToolResult, UpstreamCallResult,
        UpstreamTool,
    },
    ports::{HostToolDefinition, McpClient, ToolGroup, ToolHandler},
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::warn;

/// Version announced for every published tool group.
pub const TOOL_GROUP_VERSION: &str = "0.1.0";

/// Handler forwarding host invocations to one upstream tool.
pub struct ForwardingToolHandler {
    server: ServerName,
    tool: String,
    client: Arc<dyn McpClient>,
}

impl ForwardingToolHandler {
    /// Creates a handler calling `tool` on `client`.
    #[must_use]
    pub fn new(server: ServerName, tool: impl Into<String>, client: Arc<dyn McpClient>) -> Self {
        Self {
            server,
            tool: tool.into(),
            client,
        }
    }

    /// Returns the upstream (non-namespaced) tool name.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }
}

#[async_trait]
impl ToolHandler for ForwardingToolHandler {
    async fn call(&self, arguments: Map<String, Value>) -> ToolResult {
        match self.client.call_tool(&self.tool, arguments).await {
            Ok(result) => normalize_result(result),
            Err(err) => {
                warn!(
                    server = %self.server,
                    tool = %self.tool,
                    operation = "call_tool",
                    error = %err,
                    "upstream tool call failed"
                );
                ToolResult::error_text(err.to_string())
            }
        }
    }
}

/// Maps an upstream call result onto the host result shape.
///
/// Content is passed through unchanged; without content the whole result is
/// serialised into one text block. `is_error` is set only for a literal
/// upstream `true`.
#[must_use]
pub fn normalize_result(result: UpstreamCallResult) -> ToolResult {
    let is_error = result.is_error();
    if result.content().is_none() {
        let text = serde_json::to_string(&result).unwrap_or_else(|_| format!("{result:?}"));
        return ToolResult::new(vec![ContentBlock::text(text)], is_error);
    }
    ToolResult::new(result.into_content().unwrap_or_default(), is_error)
}

/// Builds host tool groups from discovered upstream tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolAdapterGenerator;

impl ToolAdapterGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the tool group for `server`, one adapter per discovered tool in
    /// discovery order.
    #[must_use]
    pub fn build_group(
        &self,
        server: &ServerName,
        client: &Arc<dyn McpClient>,
        tools: Vec<UpstreamTool>,
    ) -> ToolGroup {
        let adapters = tools
            .into_iter()
            .map(|tool| self.build_adapter(server, client, &tool))
            .collect();

        ToolGroup {
            name: server.group_name(),
            version: TOOL_GROUP_VERSION.to_owned(),
            tools: adapters,
        }
    }

    /// Builds the adapter publishing `tool` as `<server>.<tool>`.
    #[must_use]
    pub fn build_adapter(
        &self,
        server: &ServerName,
        client: &Arc<dyn McpClient>,
        tool: &UpstreamTool,
    ) -> HostToolDefinition {
        let name = NamespacedToolName::new(server, tool.name());
        let description = tool.description().map_or_else(
            || format!("Tool {} from {server}", tool.name()),
            ToOwned::to_owned,
        );
        let input_schema = tool
            .input_schema()
            .cloned()
            .unwrap_or_else(|| json!({ "type": "object", "properties": {} }));

        HostToolDefinition {
            name,
            description,
            input_schema,
            handler: Arc::new(ForwardingToolHandler::new(
                server.clone(),
                tool.name(),
                client.clone(),
            )),
        }
    }
}
