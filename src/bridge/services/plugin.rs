//! Host binding: plugin lifecycle around the connection registry.

use crate::bridge::{
    domain::{BridgeConfig, ConfigSchema, RejectedServer, ServerName},
    ports::{HostContext, McpClientConnector},
    services::{BridgeExtension, ConnectionRegistry, McpExtension},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Server that could not be connected during start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedServer {
    /// Server name.
    pub name: ServerName,
    /// Rendered connection error.
    pub error: String,
}

/// Outcome of [`McpBridgePlugin::init`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Servers connected, in configuration order.
    pub connected: Vec<ServerName>,
    /// Valid entries whose connection failed.
    pub failed: Vec<FailedServer>,
    /// Entries rejected by validation.
    pub rejected: Vec<RejectedServer>,
}

/// Plugin binding the bridge into a host platform.
pub struct McpBridgePlugin<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    connector: Arc<K>,
    clock: Arc<C>,
    registry: Option<Arc<ConnectionRegistry<K, C>>>,
}

impl<K, C> McpBridgePlugin<K, C>
where
    K: McpClientConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Plugin name announced to the host.
    pub const NAME: &'static str = "mcp-a2a-bridge";
    /// Plugin version announced to the host.
    pub const VERSION: &'static str = "0.1.0";
    /// Name of the published [`McpExtension`].
    pub const EXTENSION_NAME: &'static str = "mcp";

    /// Creates an uninitialized plugin.
    #[must_use]
    pub const fn new(connector: Arc<K>, clock: Arc<C>) -> Self {
        Self {
            connector,
            clock,
            registry: None,
        }
    }

    /// Returns the registry created by [`Self::init`].
    #[must_use]
    pub const fn registry(&self) -> Option<&Arc<ConnectionRegistry<K, C>>> {
        self.registry.as_ref()
    }

    /// Initializes the bridge against `context`.
    ///
    /// Registers the configuration schema, publishes the extension, then
    /// connects every configured server one after another. Individual server
    /// failures are reported, never fatal. A registry left by an earlier
    /// `init` is shut down first.
    pub async fn init(&mut self, context: HostContext) -> InitReport {
        self.shutdown().await;

        if let Some(schemas) = context.schema_registry()
            && let Err(err) = schemas.register_config_schema(Self::NAME, ConfigSchema::bridge())
        {
            warn!(plugin = Self::NAME, error = %err, "failed to register configuration schema");
        }

        let registry = Arc::new(ConnectionRegistry::new(
            self.connector.clone(),
            &context,
            self.clock.clone(),
        ));
        self.registry = Some(registry.clone());
        self.publish_extension(&context, &registry);

        let Some(store) = context.config_store() else {
            info!(plugin = Self::NAME, "no configuration store available; no servers to connect");
            return InitReport::default();
        };
        let raw = match store.load_config().await {
            Ok(raw) => raw,
            Err(err) => {
                error!(plugin = Self::NAME, error = %err, "failed to load bridge configuration");
                return InitReport::default();
            }
        };
        let loaded = match BridgeConfig::load(raw.as_ref()) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(plugin = Self::NAME, error = %err, "bridge configuration is malformed");
                return InitReport::default();
            }
        };
        for rejected in &loaded.rejected {
            warn!(
                index = rejected.index,
                server = rejected.name.as_deref().unwrap_or("<unnamed>"),
                reason = %rejected.reason,
                "skipping invalid MCP server entry"
            );
        }

        let mut report = InitReport {
            rejected: loaded.rejected,
            ..InitReport::default()
        };
        for descriptor in loaded.config.servers {
            let name = descriptor.name().clone();
            match registry.connect(descriptor).await {
                Ok(_) => report.connected.push(name),
                Err(err) => report.failed.push(FailedServer {
                    name,
                    error: err.to_string(),
                }),
            }
        }

        info!(
            plugin = Self::NAME,
            connected = report.connected.len(),
            failed = report.failed.len(),
            rejected = report.rejected.len(),
            "MCP bridge initialized"
        );
        report
    }

    fn publish_extension(&self, context: &HostContext, registry: &Arc<ConnectionRegistry<K, C>>) {
        let Some(extensions) = context.extension_registry() else {
            warn!(
                plugin = Self::NAME,
                "host cannot register extensions; runtime connect is unavailable"
            );
            return;
        };
        let mut extension = BridgeExtension::new(registry);
        if let Some(store) = context.config_store() {
            extension = extension.with_persistence(store.clone());
        }
        let published: Arc<dyn McpExtension> = Arc::new(extension);
        if let Err(err) = extensions.register_extension(Self::EXTENSION_NAME, published) {
            warn!(
                plugin = Self::NAME,
                extension = Self::EXTENSION_NAME,
                error = %err,
                "failed to publish extension"
            );
        }
    }

    /// Disconnects every server and releases the registry.
    pub async fn shutdown(&mut self) {
        let Some(registry) = self.registry.take() else {
            return;
        };
        registry.disconnect_all().await;
        info!(plugin = Self::NAME, "MCP bridge shut down");
    }
}
