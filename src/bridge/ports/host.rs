//! Host platform port: tool-group registration and plugin capabilities.
//!
//! Each capability is its own trait. [`HostContext`] carries them as
//! separately typed optional fields so callers check presence once, at the
//! point where the capability is needed.

use crate::bridge::{
    domain::{ConfigSchema, NamespacedToolName, ToolGroupName, ToolResult},
    services::McpExtension,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for host capability calls.
pub type HostResult<T> = Result<T, HostError>;

/// Invocation entry point of a published tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool. Failures are reported inside the returned result.
    async fn call(&self, arguments: Map<String, Value>) -> ToolResult;
}

/// One tool as published to the host.
#[derive(Clone)]
pub struct HostToolDefinition {
    /// Namespaced tool name.
    pub name: NamespacedToolName,
    /// Human-readable description.
    pub description: String,
    /// JSON schema of the argument object.
    pub input_schema: Value,
    /// Invocation handler.
    pub handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for HostToolDefinition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HostToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Tools registered together under one server's group name.
#[derive(Debug, Clone)]
pub struct ToolGroup {
    /// Group name (`mcp-<server>`).
    pub name: ToolGroupName,
    /// Group version.
    pub version: String,
    /// Tools in discovery order.
    pub tools: Vec<HostToolDefinition>,
}

impl ToolGroup {
    /// Returns the namespaced names of the tools in this group.
    #[must_use]
    pub fn tool_names(&self) -> Vec<NamespacedToolName> {
        self.tools.iter().map(|tool| tool.name.clone()).collect()
    }
}

/// Publishes tool groups to the host.
#[async_trait]
pub trait ToolGroupRegistrar: Send + Sync {
    /// Registers a tool group.
    async fn register_tool_group(&self, group: ToolGroup) -> HostResult<()>;
}

/// Withdraws previously published tool groups.
#[async_trait]
pub trait ToolGroupUnregistrar: Send + Sync {
    /// Removes the tool group named `group`.
    async fn unregister_tool_group(&self, group: &ToolGroupName) -> HostResult<()>;
}

/// Host-managed storage for the plugin configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Loads the stored configuration, if any.
    async fn load_config(&self) -> HostResult<Option<Value>>;

    /// Replaces the stored configuration.
    async fn save_config(&self, config: Value) -> HostResult<()>;
}

/// Publishes in-process extension surfaces to other plugins.
pub trait ExtensionRegistry: Send + Sync {
    /// Publishes `extension` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the host refuses the extension.
    fn register_extension(&self, name: &str, extension: Arc<dyn McpExtension>) -> HostResult<()>;
}

/// Accepts configuration schemas for the host settings UI.
pub trait ConfigSchemaRegistry: Send + Sync {
    /// Registers `schema` for `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the host refuses the schema.
    fn register_config_schema(&self, plugin: &str, schema: ConfigSchema) -> HostResult<()>;
}

/// Errors returned by host capability implementations.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// The host refused the request.
    #[error("host rejected request: {0}")]
    Rejected(String),

    /// Generic host failure.
    #[error("host runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl HostError {
    /// Wraps a host runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

/// Capabilities offered by the host to the bridge.
#[derive(Clone, Default)]
pub struct HostContext {
    registrar: Option<Arc<dyn ToolGroupRegistrar>>,
    unregistrar: Option<Arc<dyn ToolGroupUnregistrar>>,
    config_store: Option<Arc<dyn ConfigStore>>,
    extensions: Option<Arc<dyn ExtensionRegistry>>,
    schemas: Option<Arc<dyn ConfigSchemaRegistry>>,
}

impl HostContext {
    /// Creates a context without capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tool-group registration.
    #[must_use]
    pub fn with_registrar(mut self, registrar: Arc<dyn ToolGroupRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Adds tool-group un-registration.
    #[must_use]
    pub fn with_unregistrar(mut self, unregistrar: Arc<dyn ToolGroupUnregistrar>) -> Self {
        self.unregistrar = Some(unregistrar);
        self
    }

    /// Adds configuration storage.
    #[must_use]
    pub fn with_config_store(mut self, config_store: Arc<dyn ConfigStore>) -> Self {
        self.config_store = Some(config_store);
        self
    }

    /// Adds extension publishing.
    #[must_use]
    pub fn with_extension_registry(mut self, extensions: Arc<dyn ExtensionRegistry>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Adds configuration schema publishing.
    #[must_use]
    pub fn with_schema_registry(mut self, schemas: Arc<dyn ConfigSchemaRegistry>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    /// Returns the tool-group registrar, if offered.
    #[must_use]
    pub fn registrar(&self) -> Option<&Arc<dyn ToolGroupRegistrar>> {
        self.registrar.as_ref()
    }

    /// Returns the tool-group unregistrar, if offered.
    #[must_use]
    pub fn unregistrar(&self) -> Option<&Arc<dyn ToolGroupUnregistrar>> {
        self.unregistrar.as_ref()
    }

    /// Returns the configuration store, if offered.
    #[must_use]
    pub fn config_store(&self) -> Option<&Arc<dyn ConfigStore>> {
        self.config_store.as_ref()
    }

    /// Returns the extension registry, if offered.
    #[must_use]
    pub fn extension_registry(&self) -> Option<&Arc<dyn ExtensionRegistry>> {
        self.extensions.as_ref()
    }

    /// Returns the schema registry, if offered.
    #[must_use]
    pub fn schema_registry(&self) -> Option<&Arc<dyn ConfigSchemaRegistry>> {
        self.schemas.as_ref()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HostContext")
            .field("registrar", &self.registrar.is_some())
            .field("unregistrar", &self.unregistrar.is_some())
            .field("config_store", &self.config_store.is_some())
            .field("extensions", &self.extensions.is_some())
            .field("schemas", &self.schemas.is_some())
            .finish()
    }
}
