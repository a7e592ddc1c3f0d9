//! Low-level transport handles handed to the upstream MCP SDK.

use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

/// Spawn settings for a local MCP server subprocess.
///
/// The environment held here has already been sanitised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTransport {
    command: String,
    args: Vec<String>,
    env: Option<BTreeMap<String, String>>,
}

impl ProcessTransport {
    /// Creates process spawn settings.
    #[must_use]
    pub const fn new(
        command: String,
        args: Vec<String>,
        env: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self { command, args, env }
    }

    /// Returns the executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.command
    }

    /// Returns the command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the extra environment passed to the subprocess.
    #[must_use]
    pub const fn env(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    /// Builds the subprocess command with piped stdio.
    ///
    /// The child is killed when its handle is dropped, so a discarded
    /// connection never leaves an orphaned server behind.
    #[must_use]
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(env) = &self.env {
            command.envs(env);
        }
        command
    }
}

/// Remote endpoint for the SSE and streamable HTTP transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    url: String,
    headers: BTreeMap<String, String>,
}

impl StreamEndpoint {
    /// Creates an endpoint with outbound request headers.
    #[must_use]
    pub const fn new(url: String, headers: BTreeMap<String, String>) -> Self {
        Self { url, headers }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns headers attached to every outbound request.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Transport the upstream client connects over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportHandle {
    /// Local subprocess pipe.
    Process(ProcessTransport),
    /// One-way server-sent event stream.
    EventStream(StreamEndpoint),
    /// Bidirectional streamable HTTP.
    StreamableHttp(StreamEndpoint),
}
