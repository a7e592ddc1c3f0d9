//! Connection registry: owns every live upstream connection.
//!
//! The registry is the only writer of the name → connection map. The map is
//! guarded by a lock that is never held across an `.await`, so handshakes and
//! closes for one server never block work on another.

use crate::bridge::{
    adapters::TransportFactory,
    domain::{
        ConnectionId, NamespacedToolName, ServerDescriptor, ServerName, ServerSummary,
    },
    ports::{
        ClientInfo, HostContext, HostError, McpClient, McpClientConnector, ToolGroupRegistrar,
        ToolGroupUnregistrar, TransportHandle, UpstreamError,
    },
    services::ToolAdapterGenerator,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use mockable::Clock;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Version announced to upstream servers during the handshake.
pub const CLIENT_VERSION: &str = "0.1.0";

/// Errors returned by [`ConnectionRegistry::connect`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The host context lacks a capability needed to publish tools.
    #[error(
        "cannot register tools for MCP server '{server}': host does not provide {capability}"
    )]
    CapabilityUnavailable {
        /// Affected server.
        server: ServerName,
        /// Missing capability.
        capability: &'static str,
    },

    /// Transport setup or protocol handshake failed.
    #[error("handshake with MCP server '{server}' failed: {source}")]
    Handshake {
        /// Affected server.
        server: ServerName,
        /// Upstream failure.
        source: UpstreamError,
    },

    /// Tool discovery failed after a successful handshake.
    #[error("tool discovery on MCP server '{server}' failed: {source}")]
    Discovery {
        /// Affected server.
        server: ServerName,
        /// Upstream failure.
        source: UpstreamError,
    },

    /// The host refused the tool group.
    #[error("host rejected tools of MCP server '{server}': {source}")]
    Registration {
        /// Affected server.
        server: ServerName,
        /// Host failure.
        source: HostError,
    },
}

impl ConnectionError {
    /// Returns the server the failed operation targeted.
    #[must_use]
    pub const fn server(&self) -> &ServerName {
        match self {
            Self::CapabilityUnavailable { server, .. }
            | Self::Handshake { server, .. }
            | Self::Discovery { server, .. }
            | Self::Registration { server, .. } => server,
        }
    }
}

/// Result type for registry operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Live state of one connected server.
struct Connection {
    id: ConnectionId,
    descriptor: ServerDescriptor,
    client: Arc<dyn McpClient>,
    transport: TransportHandle,
    tool_names: Vec<NamespacedToolName>,
    connected_at: DateTime<Utc>,
}

impl Connection {
    fn summary(&self) -> ServerSummary {
        ServerSummary {
            name: self.descriptor.name().clone(),
            kind: self.descriptor.kind(),
            tool_count: self.tool_names.len(),
            connected_at: self.connected_at,
        }
    }
}

/// Registry of upstream MCP connections and their published tool groups.
///
/// Concurrent `connect`/`disconnect` calls for the *same* server name are the
/// caller's responsibility to sequence. A stale `disconnect` never removes a
/// connection installed after it started, nor withdraws its tools.
pub struct ConnectionRegistry<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    connector: Arc<K>,
    registrar: Option<Arc<dyn ToolGroupRegistrar>>,
    unregistrar: Option<Arc<dyn ToolGroupUnregistrar>>,
    clock: Arc<C>,
    transports: TransportFactory,
    adapters: ToolAdapterGenerator,
    connections: RwLock<Vec<Connection>>,
}

impl<K, C> ConnectionRegistry<K, C>
where
    K: McpClientConnector,
    C: Clock + Send + Sync,
{
    /// Creates an empty registry publishing through the tool group
    /// capabilities of `context`.
    #[must_use]
    pub fn new(connector: Arc<K>, context: &HostContext, clock: Arc<C>) -> Self {
        Self {
            connector,
            registrar: context.registrar().cloned(),
            unregistrar: context.unregistrar().cloned(),
            clock,
            transports: TransportFactory::new(),
            adapters: ToolAdapterGenerator::new(),
            connections: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Connection>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Connection>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, name: &ServerName) -> Option<(ConnectionId, Arc<dyn McpClient>)> {
        self.read()
            .iter()
            .find(|connection| connection.descriptor.name() == name)
            .map(|connection| (connection.id, connection.client.clone()))
    }

    /// Connects to a server and publishes its tools to the host.
    ///
    /// An existing connection with the same name is disconnected first.
    /// Nothing is recorded unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::CapabilityUnavailable`] when the host cannot
    /// register tool groups, and handshake, discovery or registration errors
    /// from the upstream server and host.
    pub async fn connect(&self, descriptor: ServerDescriptor) -> ConnectionResult<ServerSummary> {
        let name = descriptor.name().clone();
        let kind = descriptor.kind();

        let registrar = self.registrar.clone().ok_or_else(|| {
            error!(
                server = %name,
                kind = %kind,
                operation = "connect",
                "host context cannot register tool groups"
            );
            ConnectionError::CapabilityUnavailable {
                server: name.clone(),
                capability: "tool group registration",
            }
        })?;

        if self.contains(&name) {
            if self.unregistrar.is_none() {
                warn!(
                    server = %name,
                    "reconnecting MCP server; tools published by the previous connection stay visible until the host reloads the bridge"
                );
            } else {
                info!(server = %name, "reconnecting MCP server");
            }
            self.disconnect(&name).await;
        }

        let transport = self.transports.create(&descriptor);
        let client_info = ClientInfo::new(descriptor.client_name(), CLIENT_VERSION);
        let client = self
            .connector
            .connect(client_info, transport.clone())
            .await
            .map_err(|source| {
                error!(
                    server = %name,
                    kind = %kind,
                    operation = "handshake",
                    error = %source,
                    "failed to connect MCP server"
                );
                ConnectionError::Handshake {
                    server: name.clone(),
                    source,
                }
            })?;
        info!(server = %name, kind = %kind, "connected to MCP server");

        let tool_names = self.publish_tools(&name, &client, registrar.as_ref()).await?;

        let connection = Connection {
            id: ConnectionId::new(),
            descriptor,
            client,
            transport,
            tool_names,
            connected_at: self.clock.utc(),
        };
        let summary = connection.summary();
        self.install(connection);
        Ok(summary)
    }

    /// Discovers tools and registers them; closes `client` on failure.
    async fn publish_tools(
        &self,
        name: &ServerName,
        client: &Arc<dyn McpClient>,
        registrar: &dyn ToolGroupRegistrar,
    ) -> ConnectionResult<Vec<NamespacedToolName>> {
        let tools = match client.list_tools().await {
            Ok(tools) => tools,
            Err(source) => {
                error!(
                    server = %name,
                    operation = "list_tools",
                    error = %source,
                    "tool discovery failed"
                );
                close_client(name, client.as_ref()).await;
                return Err(ConnectionError::Discovery {
                    server: name.clone(),
                    source,
                });
            }
        };

        let group = self.adapters.build_group(name, client, tools);
        let group_name = group.name.clone();
        let tool_names = group.tool_names();

        if let Err(source) = registrar.register_tool_group(group).await {
            error!(
                server = %name,
                group = %group_name,
                operation = "register_tool_group",
                error = %source,
                "host rejected tool group"
            );
            close_client(name, client.as_ref()).await;
            return Err(ConnectionError::Registration {
                server: name.clone(),
                source,
            });
        }

        info!(
            server = %name,
            group = %group_name,
            tool_count = tool_names.len(),
            tools = ?tool_names.iter().map(NamespacedToolName::as_str).collect::<Vec<_>>(),
            "registered tool group"
        );
        Ok(tool_names)
    }

    fn install(&self, connection: Connection) {
        let mut connections = self.write();
        if let Some(slot) = connections
            .iter_mut()
            .find(|current| current.descriptor.name() == connection.descriptor.name())
        {
            warn!(
                server = %connection.descriptor.name(),
                "replacing a connection installed concurrently; its client was not closed"
            );
            *slot = connection;
            return;
        }
        connections.push(connection);
    }

    /// Disconnects a server, closing its client and withdrawing its tools.
    ///
    /// Unknown names are a no-op. Close and un-registration failures are
    /// logged, never returned; the connection is always released. Returns
    /// whether this call removed the connection.
    pub async fn disconnect(&self, name: &ServerName) -> bool {
        let Some((id, client)) = self.lookup(name) else {
            debug!(server = %name, "disconnect requested for unknown MCP server");
            return false;
        };

        close_client(name, client.as_ref()).await;

        if !self.release(id) {
            debug!(
                server = %name,
                connection = %id,
                "connection was released while closing; leaving its successor in place"
            );
            return false;
        }
        self.withdraw_group(name).await;
        info!(server = %name, "disconnected MCP server");
        true
    }

    /// Removes the record with `id`; returns whether it was still present.
    fn release(&self, id: ConnectionId) -> bool {
        let mut connections = self.write();
        let before = connections.len();
        connections.retain(|connection| connection.id != id);
        connections.len() != before
    }

    async fn withdraw_group(&self, name: &ServerName) {
        let group_name = name.group_name();
        let Some(unregistrar) = &self.unregistrar else {
            warn!(
                server = %name,
                group = %group_name,
                "host cannot unregister tool groups; tools stay visible until the host reloads the bridge"
            );
            return;
        };
        if let Err(err) = unregistrar.unregister_tool_group(&group_name).await {
            warn!(
                server = %name,
                group = %group_name,
                operation = "unregister_tool_group",
                error = %err,
                "failed to unregister tool group"
            );
        }
    }

    /// Disconnects every tracked server concurrently.
    pub async fn disconnect_all(&self) {
        let names: Vec<ServerName> = self
            .read()
            .iter()
            .map(|connection| connection.descriptor.name().clone())
            .collect();
        join_all(names.iter().map(|name| self.disconnect(name))).await;
    }

    /// Returns a snapshot of every tracked connection in insertion order.
    #[must_use]
    pub fn list_servers(&self) -> Vec<ServerSummary> {
        self.read().iter().map(Connection::summary).collect()
    }

    /// Returns whether a connection is tracked under `name`.
    #[must_use]
    pub fn contains(&self, name: &ServerName) -> bool {
        self.read()
            .iter()
            .any(|connection| connection.descriptor.name() == name)
    }

    /// Returns the tool names currently published for `name`.
    #[must_use]
    pub fn tool_names(&self, name: &ServerName) -> Option<Vec<NamespacedToolName>> {
        self.read()
            .iter()
            .find(|connection| connection.descriptor.name() == name)
            .map(|connection| connection.tool_names.clone())
    }

    /// Returns the transport the connection for `name` was established over.
    #[must_use]
    pub fn transport(&self, name: &ServerName) -> Option<TransportHandle> {
        self.read()
            .iter()
            .find(|connection| connection.descriptor.name() == name)
            .map(|connection| connection.transport.clone())
    }
}

async fn close_client(name: &ServerName, client: &dyn McpClient) {
    if let Err(err) = client.close().await {
        warn!(
            server = %name,
            operation = "close",
            error = %err,
            "error closing MCP client"
        );
    }
}
