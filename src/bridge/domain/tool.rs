//! Upstream tool metadata and host tool result value objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Tool metadata as reported by an upstream server during discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamTool {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_schema: Option<Value>,
}

impl UpstreamTool {
    /// Creates tool metadata with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    /// Sets the upstream description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the upstream input schema.
    #[must_use]
    pub fn with_input_schema(mut self, input_schema: Value) -> Self {
        self.input_schema = Some(input_schema);
        self
    }

    /// Returns the original, non-namespaced tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the upstream description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the upstream input schema, if any.
    #[must_use]
    pub const fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref()
    }
}

/// One opaque content block, passed between protocols unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentBlock(Value);

impl ContentBlock {
    /// Wraps an arbitrary content block.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Creates a `{"type": "text", "text": ...}` block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    /// Returns the text of a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        let is_text = self.0.get("type").and_then(Value::as_str) == Some("text");
        if !is_text {
            return None;
        }
        self.0.get("text").and_then(Value::as_str)
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Result of an upstream `callTool` invocation.
///
/// Fields other than `content` and `isError` are preserved so the whole
/// result can be serialised when no content is present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamCallResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<ContentBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_error: Option<Value>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl UpstreamCallResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content payload.
    #[must_use]
    pub fn with_content(mut self, content: Vec<ContentBlock>) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the raw `isError` value exactly as the upstream sent it.
    #[must_use]
    pub fn with_is_error(mut self, is_error: Value) -> Self {
        self.is_error = Some(is_error);
        self
    }

    /// Adds another top-level field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.other.insert(key.into(), value);
        self
    }

    /// Returns the content payload, if present.
    #[must_use]
    pub fn content(&self) -> Option<&[ContentBlock]> {
        self.content.as_deref()
    }

    /// Returns `true` only when the upstream sent `isError: true`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.is_error, Some(Value::Bool(true)))
    }

    /// Consumes the result, returning the content payload.
    #[must_use]
    pub fn into_content(self) -> Option<Vec<ContentBlock>> {
        self.content
    }
}

/// Result shape returned to the host by an adapter handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Content blocks of the result.
    pub content: Vec<ContentBlock>,
    /// Whether the tool reported a failure.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a result.
    #[must_use]
    pub const fn new(content: Vec<ContentBlock>, is_error: bool) -> Self {
        Self { content, is_error }
    }

    /// Creates a failed result carrying one text block.
    #[must_use]
    pub fn error_text(message: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(message)], true)
    }
}
