//! Error types for bridge domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing bridge domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// The server name is empty.
    #[error("MCP server name must not be empty")]
    EmptyServerName,

    /// The server name contains the namespace separator.
    #[error("MCP server name '{0}' must not contain the namespace separator '.'")]
    ServerNameContainsSeparator(String),

    /// The server name contains control characters.
    #[error("MCP server name '{0}' contains control characters")]
    InvalidServerName(String),

    /// The STDIO command is empty.
    #[error("STDIO command must not be empty")]
    EmptyStdioCommand,

    /// The streaming endpoint URL is empty.
    #[error("{kind} server URL must not be empty")]
    EmptyStreamUrl {
        /// Transport kind the URL belongs to.
        kind: String,
    },

    /// The streaming endpoint URL does not have an `http://` or `https://` prefix.
    #[error("{kind} server URL '{url}' must start with 'http://' or 'https://'")]
    InvalidStreamUrl {
        /// Transport kind the URL belongs to.
        kind: String,
        /// Rejected URL.
        url: String,
    },
}
