//! Extension facade: runtime connect/disconnect for other plugins.

use crate::bridge::{
    domain::{
        BridgeConfigError, ServerDescriptor, ServerName, ServerSummary, with_server_removed,
        with_server_upserted,
    },
    ports::{ConfigStore, HostError, McpClientConnector},
    services::{ConnectionError, ConnectionRegistry},
};
use async_trait::async_trait;
use mockable::Clock;
use std::fmt;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{error, info, warn};

/// Result type for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Errors surfaced by [`McpExtension`] operations.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The registry could not establish the connection.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The registry change succeeded but could not be persisted.
    #[error("failed to persist MCP server configuration: {0}")]
    Persistence(#[source] HostError),

    /// The stored configuration is not a JSON object.
    #[error("stored MCP bridge configuration is malformed: {0}")]
    PersistedConfig(#[from] BridgeConfigError),

    /// The bridge that published this extension has shut down.
    #[error("MCP bridge is shut down")]
    ShutDown,
}

/// Capability published to the host under the `mcp` extension name.
#[async_trait]
pub trait McpExtension: Send + Sync {
    /// Connects (or reconnects) a server and returns its summary.
    async fn connect(&self, descriptor: ServerDescriptor) -> ExtensionResult<ServerSummary>;

    /// Disconnects a server. Unknown names succeed.
    async fn disconnect(&self, name: &ServerName) -> ExtensionResult<()>;

    /// Returns a snapshot of the connected servers.
    fn list_servers(&self) -> Vec<ServerSummary>;
}

/// [`McpExtension`] backed by a [`ConnectionRegistry`].
///
/// The registry is held weakly: once its owner shuts down, operations fail
/// with [`ExtensionError::ShutDown`] and listing returns nothing. With a
/// configuration store attached, successful connects and every disconnect are
/// written back so the next start sees the same servers.
pub struct BridgeExtension<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    registry: Weak<ConnectionRegistry<K, C>>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl<K, C> BridgeExtension<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    /// Creates a facade over `registry` without persistence.
    #[must_use]
    pub fn new(registry: &Arc<ConnectionRegistry<K, C>>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            store: None,
        }
    }

    fn registry(&self) -> ExtensionResult<Arc<ConnectionRegistry<K, C>>> {
        self.registry.upgrade().ok_or_else(|| {
            warn!("MCP extension used after the bridge shut down");
            ExtensionError::ShutDown
        })
    }

    /// Attaches a configuration store for write-back.
    #[must_use]
    pub fn with_persistence(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    async fn persist<F>(&self, server: &ServerName, update: F) -> ExtensionResult<()>
    where
        F: FnOnce(Option<serde_json::Value>) -> Result<serde_json::Value, BridgeConfigError>
            + Send,
    {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let current = store.load_config().await.map_err(|err| {
            error!(
                server = %server,
                operation = "load_config",
                error = %err,
                "failed to load bridge configuration"
            );
            ExtensionError::Persistence(err)
        })?;
        let updated = update(current).inspect_err(|err| {
            error!(server = %server, error = %err, "stored bridge configuration is malformed");
        })?;
        store.save_config(updated).await.map_err(|err| {
            error!(
                server = %server,
                operation = "save_config",
                error = %err,
                "failed to save bridge configuration"
            );
            ExtensionError::Persistence(err)
        })
    }
}

impl<K, C> fmt::Debug for BridgeExtension<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BridgeExtension")
            .field("persistent", &self.store.is_some())
            .field("live", &(self.registry.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<K, C> McpExtension for BridgeExtension<K, C>
where
    K: McpClientConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn connect(&self, descriptor: ServerDescriptor) -> ExtensionResult<ServerSummary> {
        let summary = self.registry()?.connect(descriptor.clone()).await?;
        self.persist(descriptor.name(), |config| {
            with_server_upserted(config, &descriptor)
        })
        .await?;
        info!(server = %summary.name, "MCP server connected through extension");
        Ok(summary)
    }

    async fn disconnect(&self, name: &ServerName) -> ExtensionResult<()> {
        self.registry()?.disconnect(name).await;
        self.persist(name, |config| with_server_removed(config, name))
            .await
    }

    fn list_servers(&self) -> Vec<ServerSummary> {
        self.registry
            .upgrade()
            .map(|registry| registry.list_servers())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapters::memory::{InMemoryMcpConnector, InMemoryToolHost};
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::json;

    type TestRegistry = ConnectionRegistry<InMemoryMcpConnector, DefaultClock>;

    fn registry(host: &Arc<InMemoryToolHost>) -> Arc<TestRegistry> {
        Arc::new(ConnectionRegistry::new(
            Arc::new(InMemoryMcpConnector::new()),
            &host.context(),
            Arc::new(DefaultClock),
        ))
    }

    fn extension(
        host: &Arc<InMemoryToolHost>,
        registry: &Arc<TestRegistry>,
    ) -> BridgeExtension<InMemoryMcpConnector, DefaultClock> {
        BridgeExtension::new(registry).with_persistence(host.clone())
    }

    fn descriptor(name: &str) -> ServerDescriptor {
        ServerDescriptor::from_value(json!({
            "name": name,
            "kind": "http",
            "url": "https://mcp.example.com"
        }))
        .expect("valid descriptor")
    }

    #[rstest]
    #[tokio::test]
    async fn connect_persists_descriptor_and_keeps_other_keys() {
        let host = Arc::new(InMemoryToolHost::with_config(json!({
            "theme": "dark",
            "servers": [{"name": "notes", "kind": "stdio", "cmd": "notes-mcp"}]
        })));

        extension(&host, &registry(&host))
            .connect(descriptor("search"))
            .await
            .expect("connect should succeed");

        let stored = host.stored_config().expect("config should be saved");
        assert_eq!(stored["theme"], "dark");
        let names: Vec<&str> = stored["servers"]
            .as_array()
            .expect("servers array")
            .iter()
            .filter_map(|server| server["name"].as_str())
            .collect();
        assert_eq!(names, ["notes", "search"]);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_connect_is_not_persisted() {
        let host = Arc::new(InMemoryToolHost::new());
        host.reject_registrations("no more tool groups");

        let result = extension(&host, &registry(&host))
            .connect(descriptor("search"))
            .await;

        assert!(matches!(result, Err(ExtensionError::Connection(_))));
        assert!(host.saved_configs().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn disconnect_of_unknown_server_still_rewrites_config() {
        let host = Arc::new(InMemoryToolHost::with_config(json!({
            "servers": [{"name": "stale", "kind": "stdio", "cmd": "stale-mcp"}]
        })));
        let name = ServerName::new("stale").expect("valid name");

        extension(&host, &registry(&host))
            .disconnect(&name)
            .await
            .expect("disconnect should succeed");

        assert_eq!(host.stored_config(), Some(json!({"servers": []})));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_stored_config_surfaces_after_connect() {
        let host = Arc::new(InMemoryToolHost::with_config(json!(["not", "an", "object"])));
        let registry = registry(&host);
        let facade = extension(&host, &registry);

        let result = facade.connect(descriptor("search")).await;

        assert!(matches!(result, Err(ExtensionError::PersistedConfig(_))));
        assert_eq!(facade.list_servers().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_registry_refuses_operations() {
        let host = Arc::new(InMemoryToolHost::new());
        let facade = extension(&host, &registry(&host));

        let connected = facade.connect(descriptor("search")).await;
        let disconnected = facade
            .disconnect(&ServerName::new("search").expect("valid name"))
            .await;

        assert!(matches!(connected, Err(ExtensionError::ShutDown)));
        assert!(matches!(disconnected, Err(ExtensionError::ShutDown)));
        assert!(facade.list_servers().is_empty());
        assert!(host.registrations().is_empty());
        assert!(host.saved_configs().is_empty());
    }
}
