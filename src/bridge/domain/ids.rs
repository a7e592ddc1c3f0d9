//! Identifier and validated-name types for bridged MCP servers.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Separator joining a server name and an upstream tool name.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Prefix of the host-side tool group published for each server.
const TOOL_GROUP_PREFIX: &str = "mcp-";

/// Prefix of the client name announced to upstream servers.
const CLIENT_NAME_PREFIX: &str = "mcp-a2a-bridge-";

/// Identifier of one live connection instance.
///
/// Reconnecting under the same server name produces a fresh identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new random connection identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated MCP server name.
///
/// Names are the unique registry key and the namespace prefix of every
/// published tool, so they may not contain [`NAMESPACE_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated server name.
    ///
    /// The name is kept verbatim so it matches the stored configuration entry
    /// it came from.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when the name is empty, contains
    /// [`NAMESPACE_SEPARATOR`], or contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let raw = value.into();

        if raw.is_empty() {
            return Err(ToolRegistryDomainError::EmptyServerName);
        }

        if raw.contains(NAMESPACE_SEPARATOR) {
            return Err(ToolRegistryDomainError::ServerNameContainsSeparator(raw));
        }

        if raw.chars().any(char::is_control) {
            return Err(ToolRegistryDomainError::InvalidServerName(raw));
        }

        Ok(Self(raw))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the host tool group name derived from this server name.
    #[must_use]
    pub fn group_name(&self) -> ToolGroupName {
        ToolGroupName(format!("{TOOL_GROUP_PREFIX}{}", self.0))
    }

    /// Returns the client name announced during the upstream handshake.
    #[must_use]
    pub fn client_name(&self) -> String {
        format!("{CLIENT_NAME_PREFIX}{}", self.0)
    }
}

impl TryFrom<String> for ServerName {
    type Error = ToolRegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerName> for String {
    fn from(value: ServerName) -> Self {
        value.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of the host tool group published for one server (`mcp-<server>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolGroupName(String);

impl ToolGroupName {
    /// Returns the group name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolGroupName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ToolGroupName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Host-visible tool name of the form `<server>.<tool>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespacedToolName(String);

impl NamespacedToolName {
    /// Joins a server name and an upstream tool name.
    ///
    /// The upstream name is used as given; an empty one yields `<server>.`.
    #[must_use]
    pub fn new(server: &ServerName, tool: &str) -> Self {
        Self(format!("{server}{NAMESPACE_SEPARATOR}{tool}"))
    }

    /// Returns the namespaced name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NamespacedToolName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for NamespacedToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
