//! Transport factory: turns a server descriptor into a transport handle.

use crate::bridge::{
    domain::{McpTransport, ServerDescriptor, StdioTransportConfig, StreamTransportConfig},
    ports::{ProcessTransport, StreamEndpoint, TransportHandle},
};
use std::collections::BTreeMap;
use tracing::debug;

/// Environment keys that can redirect dynamic linking, module resolution or
/// interpreter start-up in a spawned subprocess. Matched exactly.
pub const DENIED_ENV_KEYS: &[&str] = &[
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
    "DYLD_INSERT_LIBRARIES",
    "DYLD_LIBRARY_PATH",
    "NODE_OPTIONS",
    "NODE_PATH",
    "PATH",
    "PYTHONPATH",
    "PYTHONSTARTUP",
    "PYTHONHOME",
    "PERL5LIB",
    "PERL5OPT",
    "RUBYOPT",
    "RUBYLIB",
];

/// Builds transport handles for server descriptors.
///
/// Construction is pure: no connection is opened and no process is spawned.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportFactory;

impl TransportFactory {
    /// Creates a transport factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates the transport handle for `descriptor`.
    #[must_use]
    pub fn create(&self, descriptor: &ServerDescriptor) -> TransportHandle {
        match descriptor.transport() {
            McpTransport::Stdio(config) => {
                TransportHandle::Process(process_transport(descriptor, config))
            }
            McpTransport::Sse(config) => TransportHandle::EventStream(stream_endpoint(config)),
            McpTransport::Http(config) => {
                TransportHandle::StreamableHttp(stream_endpoint(config))
            }
        }
    }
}

fn process_transport(
    descriptor: &ServerDescriptor,
    config: &StdioTransportConfig,
) -> ProcessTransport {
    let env = config
        .env()
        .map(|values| sanitize_env(descriptor, values));
    ProcessTransport::new(config.command().to_owned(), config.args().to_vec(), env)
}

fn stream_endpoint(config: &StreamTransportConfig) -> StreamEndpoint {
    StreamEndpoint::new(
        config.url().to_owned(),
        config.headers().cloned().unwrap_or_default(),
    )
}

/// Drops deny-listed keys from a caller-supplied environment map.
fn sanitize_env(
    descriptor: &ServerDescriptor,
    env: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    env.iter()
        .filter(|(key, _)| {
            let denied = DENIED_ENV_KEYS.contains(&key.as_str());
            if denied {
                debug!(
                    server = %descriptor.name(),
                    key = %key,
                    "dropping deny-listed environment variable"
                );
            }
            !denied
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
