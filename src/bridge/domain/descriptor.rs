//! Server descriptor: the validated configuration of one upstream server.

use super::{
    McpTransport, ServerName, StdioTransportConfig, StreamTransportConfig, ToolGroupName,
    ToolRegistryDomainError, TransportKind,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of one upstream MCP server.
///
/// The serialised form is the flat, `kind`-tagged shape used in the plugin
/// configuration:
///
/// ```json
/// { "name": "gmail", "kind": "stdio", "cmd": "npx", "args": ["-y", "server-gmail"] }
/// { "name": "linear", "kind": "sse", "url": "https://mcp.linear.app/sse" }
/// ```
///
/// Deserialisation rejects unknown kinds, missing kind-specific fields and
/// invalid names before any connection attempt is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ServerDescriptorRecord", into = "ServerDescriptorRecord")]
pub struct ServerDescriptor {
    name: ServerName,
    transport: McpTransport,
}

impl ServerDescriptor {
    /// Creates a descriptor from validated parts.
    #[must_use]
    pub const fn new(name: ServerName, transport: McpTransport) -> Self {
        Self { name, transport }
    }

    /// Parses and validates a descriptor from its JSON configuration shape.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] describing the first validation failure.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Returns the unique server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn transport(&self) -> &McpTransport {
        &self.transport
    }

    /// Returns the transport kind tag.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Returns the host tool group name for this server.
    #[must_use]
    pub fn group_name(&self) -> ToolGroupName {
        self.name.group_name()
    }

    /// Returns the client name announced during the upstream handshake.
    #[must_use]
    pub fn client_name(&self) -> String {
        self.name.client_name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ServerDescriptorRecord {
    Stdio {
        name: String,
        cmd: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        env: Option<BTreeMap<String, String>>,
    },
    Sse {
        name: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<BTreeMap<String, String>>,
    },
    Http {
        name: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<BTreeMap<String, String>>,
    },
}

fn stream_config(
    kind: TransportKind,
    url: String,
    headers: Option<BTreeMap<String, String>>,
) -> Result<StreamTransportConfig, ToolRegistryDomainError> {
    let config = StreamTransportConfig::new(kind, url)?;
    Ok(match headers {
        Some(values) => config.with_headers(values),
        None => config,
    })
}

impl TryFrom<ServerDescriptorRecord> for ServerDescriptor {
    type Error = ToolRegistryDomainError;

    fn try_from(record: ServerDescriptorRecord) -> Result<Self, Self::Error> {
        let (name, transport) = match record {
            ServerDescriptorRecord::Stdio {
                name,
                cmd,
                args,
                env,
            } => {
                let config = StdioTransportConfig::new(cmd)?.with_args(args);
                let with_env = match env {
                    Some(values) => config.with_env(values),
                    None => config,
                };
                (name, McpTransport::Stdio(with_env))
            }
            ServerDescriptorRecord::Sse { name, url, headers } => (
                name,
                McpTransport::Sse(stream_config(TransportKind::Sse, url, headers)?),
            ),
            ServerDescriptorRecord::Http { name, url, headers } => (
                name,
                McpTransport::Http(stream_config(TransportKind::Http, url, headers)?),
            ),
        };

        Ok(Self::new(ServerName::new(name)?, transport))
    }
}

impl From<ServerDescriptor> for ServerDescriptorRecord {
    fn from(descriptor: ServerDescriptor) -> Self {
        let name = String::from(descriptor.name);
        match descriptor.transport {
            McpTransport::Stdio(config) => Self::Stdio {
                name,
                cmd: config.command().to_owned(),
                args: config.args().to_vec(),
                env: config.env().cloned(),
            },
            McpTransport::Sse(config) => Self::Sse {
                name,
                url: config.url().to_owned(),
                headers: config.headers().cloned(),
            },
            McpTransport::Http(config) => Self::Http {
                name,
                url: config.url().to_owned(),
                headers: config.headers().cloned(),
            },
        }
    }
}
