//! In-memory upstream connector with scripted servers.

use crate::bridge::{
    domain::{ContentBlock, ServerName, UpstreamCallResult, UpstreamTool},
    ports::{
        ClientInfo, McpClient, McpClientConnector, TransportHandle, UpstreamError,
        UpstreamResult,
    },
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One tool invocation observed by a scripted server.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Upstream (non-namespaced) tool name.
    pub tool: String,
    /// Arguments exactly as received.
    pub arguments: Map<String, Value>,
}

/// In-memory MCP connector.
///
/// Servers are scripted by name: their tool catalog, canned call results and
/// failures at each protocol step. Servers without a script complete the
/// handshake and expose no tools.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMcpConnector {
    state: Arc<RwLock<ConnectorState>>,
}

#[derive(Debug, Default)]
struct ConnectorState {
    scripts: HashMap<String, ServerScript>,
    transports: Vec<TransportHandle>,
}

#[derive(Debug, Default)]
struct ServerScript {
    tools: Vec<UpstreamTool>,
    call_results: HashMap<String, UpstreamCallResult>,
    call_failures: HashMap<String, String>,
    handshake_failure: Option<String>,
    list_failure: Option<String>,
    close_failure: Option<String>,
    handshakes: usize,
    closes: usize,
    calls: Vec<RecordedCall>,
}

impl InMemoryMcpConnector {
    /// Creates a connector with no scripted servers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ConnectorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConnectorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn script<T>(&self, server: &ServerName, update: impl FnOnce(&mut ServerScript) -> T) -> T {
        let mut state = self.write();
        update(state.scripts.entry(server.client_name()).or_default())
    }

    fn inspect<T: Default>(&self, server: &ServerName, read: impl FnOnce(&ServerScript) -> T) -> T {
        self.read()
            .scripts
            .get(&server.client_name())
            .map(read)
            .unwrap_or_default()
    }

    /// Replaces the tool catalog of `server`.
    pub fn set_tool_catalog(&self, server: &ServerName, tools: Vec<UpstreamTool>) {
        self.script(server, |script| script.tools = tools);
    }

    /// Sets the result returned when `tool` is called on `server`.
    pub fn set_call_result(&self, server: &ServerName, tool: &str, result: UpstreamCallResult) {
        self.script(server, |script| {
            script.call_results.insert(tool.to_owned(), result);
        });
    }

    /// Makes calls to `tool` on `server` fail with `message`.
    pub fn fail_call(&self, server: &ServerName, tool: &str, message: impl Into<String>) {
        let message = message.into();
        self.script(server, |script| {
            script.call_failures.insert(tool.to_owned(), message);
        });
    }

    /// Makes the handshake with `server` fail with `message`.
    pub fn fail_handshake(&self, server: &ServerName, message: impl Into<String>) {
        let message = message.into();
        self.script(server, |script| script.handshake_failure = Some(message));
    }

    /// Makes tool discovery on `server` fail with `message`.
    pub fn fail_list_tools(&self, server: &ServerName, message: impl Into<String>) {
        let message = message.into();
        self.script(server, |script| script.list_failure = Some(message));
    }

    /// Makes closing clients of `server` fail with `message`.
    pub fn fail_close(&self, server: &ServerName, message: impl Into<String>) {
        let message = message.into();
        self.script(server, |script| script.close_failure = Some(message));
    }

    /// Returns how many handshakes with `server` succeeded.
    #[must_use]
    pub fn handshake_count(&self, server: &ServerName) -> usize {
        self.inspect(server, |script| script.handshakes)
    }

    /// Returns how many times clients of `server` were asked to close.
    #[must_use]
    pub fn close_count(&self, server: &ServerName) -> usize {
        self.inspect(server, |script| script.closes)
    }

    /// Returns the tool calls received by `server`, in order.
    #[must_use]
    pub fn calls(&self, server: &ServerName) -> Vec<RecordedCall> {
        self.inspect(server, |script| script.calls.clone())
    }

    /// Returns every transport a connection was attempted over, in order.
    #[must_use]
    pub fn transports(&self) -> Vec<TransportHandle> {
        self.read().transports.clone()
    }
}

#[async_trait]
impl McpClientConnector for InMemoryMcpConnector {
    async fn connect(
        &self,
        client_info: ClientInfo,
        transport: TransportHandle,
    ) -> UpstreamResult<Arc<dyn McpClient>> {
        let mut state = self.write();
        state.transports.push(transport);
        let script = state.scripts.entry(client_info.name.clone()).or_default();
        if let Some(message) = &script.handshake_failure {
            return Err(UpstreamError::Handshake(message.clone()));
        }
        script.handshakes += 1;

        Ok(Arc::new(InMemoryMcpClient {
            client_name: client_info.name,
            state: self.state.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Client session produced by [`InMemoryMcpConnector`].
#[derive(Debug)]
struct InMemoryMcpClient {
    client_name: String,
    state: Arc<RwLock<ConnectorState>>,
    closed: AtomicBool,
}

impl InMemoryMcpClient {
    fn with_script<T>(&self, update: impl FnOnce(&mut ServerScript) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(state.scripts.entry(self.client_name.clone()).or_default())
    }

    fn ensure_open(&self) -> UpstreamResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(UpstreamError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl McpClient for InMemoryMcpClient {
    async fn list_tools(&self) -> UpstreamResult<Vec<UpstreamTool>> {
        self.ensure_open()?;
        self.with_script(|script| match &script.list_failure {
            Some(message) => Err(UpstreamError::Protocol(message.clone())),
            None => Ok(script.tools.clone()),
        })
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> UpstreamResult<UpstreamCallResult> {
        self.ensure_open()?;
        self.with_script(|script| {
            script.calls.push(RecordedCall {
                tool: name.to_owned(),
                arguments,
            });
            if let Some(message) = script.call_failures.get(name) {
                return Err(UpstreamError::Protocol(message.clone()));
            }
            Ok(script.call_results.get(name).cloned().unwrap_or_else(|| {
                UpstreamCallResult::new()
                    .with_content(vec![ContentBlock::text(format!("{name} ok"))])
            }))
        })
    }

    async fn close(&self) -> UpstreamResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.with_script(|script| {
            script.closes += 1;
            script
                .close_failure
                .as_ref()
                .map_or(Ok(()), |message| Err(UpstreamError::Protocol(message.clone())))
        })
    }
}
