//! In-memory host adapter recording tool-group and plugin interactions.

use crate::bridge::{
    domain::{ConfigSchema, ToolGroupName},
    ports::{
        ConfigSchemaRegistry, ConfigStore, ExtensionRegistry, HostContext, HostError,
        HostResult, ToolGroup, ToolGroupRegistrar, ToolGroupUnregistrar,
    },
    services::McpExtension,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory host adapter.
///
/// This adapter implements every host capability without a real platform.
/// It records what the bridge publishes so tests and local wiring can
/// inspect it.
#[derive(Clone, Default)]
pub struct InMemoryToolHost {
    state: Arc<RwLock<InMemoryHostState>>,
}

#[derive(Default)]
struct InMemoryHostState {
    registrations: Vec<ToolGroup>,
    unregistrations: Vec<ToolGroupName>,
    registration_rejection: Option<String>,
    config: Option<Value>,
    saved_configs: Vec<Value>,
    extensions: Vec<(String, Arc<dyn McpExtension>)>,
    schemas: Vec<(String, ConfigSchema)>,
}

impl InMemoryToolHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host whose configuration store holds `config`.
    #[must_use]
    pub fn with_config(config: Value) -> Self {
        let host = Self::new();
        host.write().config = Some(config);
        host
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryHostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryHostState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a context exposing every capability of this host.
    #[must_use]
    pub fn context(self: &Arc<Self>) -> HostContext {
        self.context_without_unregistration()
            .with_unregistrar(self.clone())
    }

    /// Returns a context that cannot withdraw tool groups, like older hosts.
    #[must_use]
    pub fn context_without_unregistration(self: &Arc<Self>) -> HostContext {
        HostContext::new()
            .with_registrar(self.clone())
            .with_config_store(self.clone())
            .with_extension_registry(self.clone())
            .with_schema_registry(self.clone())
    }

    /// Makes subsequent tool-group registrations fail with `reason`.
    pub fn reject_registrations(&self, reason: impl Into<String>) {
        self.write().registration_rejection = Some(reason.into());
    }

    /// Returns every tool group registered so far, in order.
    #[must_use]
    pub fn registrations(&self) -> Vec<ToolGroup> {
        self.read().registrations.clone()
    }

    /// Returns how many times `group` has been registered.
    #[must_use]
    pub fn registration_count(&self, group: &ToolGroupName) -> usize {
        self.read()
            .registrations
            .iter()
            .filter(|registered| &registered.name == group)
            .count()
    }

    /// Returns every tool group withdrawn so far, in order.
    #[must_use]
    pub fn unregistrations(&self) -> Vec<ToolGroupName> {
        self.read().unregistrations.clone()
    }

    /// Returns the currently stored configuration.
    #[must_use]
    pub fn stored_config(&self) -> Option<Value> {
        self.read().config.clone()
    }

    /// Returns every configuration saved through the store, in order.
    #[must_use]
    pub fn saved_configs(&self) -> Vec<Value> {
        self.read().saved_configs.clone()
    }

    /// Returns the extension published under `name`.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<Arc<dyn McpExtension>> {
        self.read()
            .extensions
            .iter()
            .find(|(published, _)| published == name)
            .map(|(_, extension)| extension.clone())
    }

    /// Returns the configuration schemas registered so far.
    #[must_use]
    pub fn schemas(&self) -> Vec<(String, ConfigSchema)> {
        self.read().schemas.clone()
    }
}

#[async_trait]
impl ToolGroupRegistrar for InMemoryToolHost {
    async fn register_tool_group(&self, group: ToolGroup) -> HostResult<()> {
        let mut state = self.write();
        if let Some(reason) = &state.registration_rejection {
            return Err(HostError::Rejected(reason.clone()));
        }
        state.registrations.push(group);
        Ok(())
    }
}

#[async_trait]
impl ToolGroupUnregistrar for InMemoryToolHost {
    async fn unregister_tool_group(&self, group: &ToolGroupName) -> HostResult<()> {
        self.write().unregistrations.push(group.clone());
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for InMemoryToolHost {
    async fn load_config(&self) -> HostResult<Option<Value>> {
        Ok(self.read().config.clone())
    }

    async fn save_config(&self, config: Value) -> HostResult<()> {
        let mut state = self.write();
        state.saved_configs.push(config.clone());
        state.config = Some(config);
        Ok(())
    }
}

impl ExtensionRegistry for InMemoryToolHost {
    fn register_extension(&self, name: &str, extension: Arc<dyn McpExtension>) -> HostResult<()> {
        let mut state = self.write();
        state.extensions.retain(|(published, _)| published != name);
        state.extensions.push((name.to_owned(), extension));
        Ok(())
    }
}

impl ConfigSchemaRegistry for InMemoryToolHost {
    fn register_config_schema(&self, plugin: &str, schema: ConfigSchema) -> HostResult<()> {
        self.write().schemas.push((plugin.to_owned(), schema));
        Ok(())
    }
}
