//! In-memory adapters for the host and upstream ports.

mod host;
mod upstream;

pub use host::InMemoryToolHost;
pub use upstream::{InMemoryMcpConnector, RecordedCall};
