//! Upstream adapter on the `rmcp` SDK.
//!
//! Maps each [`TransportHandle`] onto the matching SDK client transport:
//! subprocesses onto the child-process transport, event streams onto the SSE
//! client and streamable HTTP endpoints onto the streamable HTTP client. Tool
//! catalogues and call results are exchanged as MCP wire JSON, so the domain
//! shapes decode straight from the SDK models.

use crate::bridge::{
    domain::{UpstreamCallResult, UpstreamTool},
    ports::{
        ClientInfo, McpClient, McpClientConnector, StreamEndpoint, TransportHandle,
        UpstreamError, UpstreamResult,
    },
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParam, ClientInfo as SdkClientInfo, Implementation},
    service::{Peer, RoleClient, RunningService},
    transport::{
        TokioChildProcess,
        sse_client::{SseClientConfig, SseClientTransport},
        streamable_http_client::{
            StreamableHttpClientTransport, StreamableHttpClientTransportConfig,
        },
    },
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

type Session = RunningService<RoleClient, SdkClientInfo>;

/// [`McpClientConnector`] establishing real sessions through `rmcp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmcpConnector;

impl RmcpConnector {
    /// Creates a connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpClientConnector for RmcpConnector {
    async fn connect(
        &self,
        client_info: ClientInfo,
        transport: TransportHandle,
    ) -> UpstreamResult<Arc<dyn McpClient>> {
        let identity = SdkClientInfo {
            client_info: Implementation {
                name: client_info.name,
                version: client_info.version,
            },
            ..SdkClientInfo::default()
        };

        let session = match transport {
            TransportHandle::Process(process) => {
                debug!(program = process.program(), "spawning MCP server subprocess");
                let child =
                    TokioChildProcess::new(process.command()).map_err(UpstreamError::runtime)?;
                identity.serve(child).await.map_err(|err| handshake_failed(&err))?
            }
            TransportHandle::EventStream(endpoint) => {
                debug!(url = endpoint.url(), "opening MCP event stream");
                let config = SseClientConfig {
                    sse_endpoint: endpoint.url().into(),
                    ..SseClientConfig::default()
                };
                let sse = SseClientTransport::start_with_client(http_client(&endpoint)?, config)
                    .await
                    .map_err(UpstreamError::runtime)?;
                identity.serve(sse).await.map_err(|err| handshake_failed(&err))?
            }
            TransportHandle::StreamableHttp(endpoint) => {
                debug!(url = endpoint.url(), "opening MCP streamable HTTP session");
                let config = StreamableHttpClientTransportConfig {
                    uri: endpoint.url().into(),
                    ..StreamableHttpClientTransportConfig::default()
                };
                let http =
                    StreamableHttpClientTransport::with_client(http_client(&endpoint)?, config);
                identity.serve(http).await.map_err(|err| handshake_failed(&err))?
            }
        };

        Ok(Arc::new(RmcpClient::new(session)))
    }
}

fn handshake_failed<E: fmt::Display>(err: &E) -> UpstreamError {
    UpstreamError::Handshake(err.to_string())
}

/// HTTP client sending the endpoint headers with every request.
fn http_client(endpoint: &StreamEndpoint) -> UpstreamResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in endpoint.headers() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(UpstreamError::runtime)?;
        let header_value = HeaderValue::from_str(value).map_err(UpstreamError::runtime)?;
        headers.insert(header_name, header_value);
    }
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(UpstreamError::runtime)
}

/// Re-reads an SDK model as the equivalent domain shape.
fn convert<T, U>(value: &T) -> UpstreamResult<U>
where
    T: Serialize,
    U: DeserializeOwned,
{
    serde_json::to_value(value)
        .and_then(serde_json::from_value)
        .map_err(UpstreamError::runtime)
}

/// Live `rmcp` session.
struct RmcpClient {
    peer: Peer<RoleClient>,
    session: Mutex<Option<Session>>,
}

impl RmcpClient {
    fn new(session: Session) -> Self {
        Self {
            peer: session.peer().clone(),
            session: Mutex::new(Some(session)),
        }
    }

    fn take_session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl McpClient for RmcpClient {
    async fn list_tools(&self) -> UpstreamResult<Vec<UpstreamTool>> {
        let tools = self
            .peer
            .list_all_tools()
            .await
            .map_err(UpstreamError::runtime)?;
        tools.iter().map(convert).collect()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> UpstreamResult<UpstreamCallResult> {
        let request = CallToolRequestParam {
            name: name.to_owned().into(),
            arguments: Some(arguments),
        };
        let result = self
            .peer
            .call_tool(request)
            .await
            .map_err(UpstreamError::runtime)?;
        convert(&result)
    }

    async fn close(&self) -> UpstreamResult<()> {
        let Some(session) = self.take_session() else {
            return Err(UpstreamError::Closed);
        };
        let reason = session.cancel().await.map_err(UpstreamError::runtime)?;
        debug!(reason = ?reason, "MCP session closed");
        Ok(())
    }
}
