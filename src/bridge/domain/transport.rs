//! MCP server transport configuration value objects.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Transport kind tag used in server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Local subprocess speaking MCP over stdin/stdout.
    Stdio,
    /// One-way server-sent event stream.
    Sse,
    /// Bidirectional streamable HTTP.
    Http,
}

impl TransportKind {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Http => "http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Transport settings for an MCP server hosted over STDIO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTransportConfig {
    command: String,
    args: Vec<String>,
    env: Option<BTreeMap<String, String>>,
}

impl StdioTransportConfig {
    /// Creates a new STDIO transport configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyStdioCommand`] when `command`
    /// is empty after trimming.
    pub fn new(command: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let normalized_command = command.into().trim().to_owned();
        if normalized_command.is_empty() {
            return Err(ToolRegistryDomainError::EmptyStdioCommand);
        }

        Ok(Self {
            command: normalized_command,
            args: Vec::new(),
            env: None,
        })
    }

    /// Replaces command-line arguments.
    #[must_use]
    pub fn with_args(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.args = values.into_iter().collect();
        self
    }

    /// Replaces the caller-supplied environment map.
    #[must_use]
    pub fn with_env(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = Some(values.into_iter().collect());
        self
    }

    /// Returns the executable command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the caller-supplied environment, unsanitised.
    #[must_use]
    pub const fn env(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }
}

/// Endpoint settings shared by the SSE and streamable HTTP transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTransportConfig {
    url: String,
    headers: Option<BTreeMap<String, String>>,
}

impl StreamTransportConfig {
    /// Creates a streaming transport configuration for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when `url` is empty or does not
    /// start with `http://` or `https://`.
    pub fn new(
        kind: TransportKind,
        url: impl Into<String>,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_url = url.into().trim().to_owned();
        if normalized_url.is_empty() {
            return Err(ToolRegistryDomainError::EmptyStreamUrl {
                kind: kind.as_str().to_owned(),
            });
        }

        let has_valid_prefix =
            normalized_url.starts_with("http://") || normalized_url.starts_with("https://");
        if !has_valid_prefix {
            return Err(ToolRegistryDomainError::InvalidStreamUrl {
                kind: kind.as_str().to_owned(),
                url: normalized_url,
            });
        }

        Ok(Self {
            url: normalized_url,
            headers: None,
        })
    }

    /// Replaces the outbound request headers.
    #[must_use]
    pub fn with_headers(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers = Some(values.into_iter().collect());
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the optional outbound request headers.
    #[must_use]
    pub const fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }
}

/// Supported MCP transport configuration variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum McpTransport {
    /// MCP over local process STDIO.
    Stdio(StdioTransportConfig),
    /// MCP over a server-sent event stream.
    Sse(StreamTransportConfig),
    /// MCP over streamable HTTP.
    Http(StreamTransportConfig),
}

impl McpTransport {
    /// Creates a `stdio` transport.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`StdioTransportConfig::new`].
    pub fn stdio(command: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Stdio(StdioTransportConfig::new(command)?))
    }

    /// Creates an `sse` transport.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`StreamTransportConfig::new`].
    pub fn sse(url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Sse(StreamTransportConfig::new(
            TransportKind::Sse,
            url,
        )?))
    }

    /// Creates an `http` transport.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`StreamTransportConfig::new`].
    pub fn http(url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Http(StreamTransportConfig::new(
            TransportKind::Http,
            url,
        )?))
    }

    /// Returns the kind tag of this transport.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio(_) => TransportKind::Stdio,
            Self::Sse(_) => TransportKind::Sse,
            Self::Http(_) => TransportKind::Http,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("stdio", TransportKind::Stdio)]
    #[case("sse", TransportKind::Sse)]
    #[case("http", TransportKind::Http)]
    fn kind_tags_match_configuration_spelling(
        #[case] raw: &str,
        #[case] expected: TransportKind,
    ) {
        let parsed: TransportKind =
            serde_json::from_value(serde_json::json!(raw)).expect("known kind");
        assert_eq!(parsed, expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn unknown_kind_tag_is_rejected() {
        let result = serde_json::from_value::<TransportKind>(serde_json::json!("websocket"));
        assert!(result.is_err());
    }

    #[test]
    fn stdio_requires_command() {
        assert_eq!(
            McpTransport::stdio("  "),
            Err(ToolRegistryDomainError::EmptyStdioCommand)
        );
    }

    #[rstest]
    #[case("")]
    #[case("mcp.linear.app/sse")]
    #[case("ftp://mcp.linear.app")]
    fn stream_transports_require_http_url(#[case] url: &str) {
        assert!(McpTransport::sse(url).is_err());
        assert!(McpTransport::http(url).is_err());
    }

    #[test]
    fn kind_matches_variant() {
        let transport = McpTransport::sse("https://mcp.linear.app/sse").expect("valid url");
        assert_eq!(transport.kind(), TransportKind::Sse);
    }
}
