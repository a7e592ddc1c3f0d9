//! Adapter implementations for the bridge ports.

pub mod memory;

mod sdk;
mod transport;

pub use sdk::RmcpConnector;
pub use transport::{DENIED_ENV_KEYS, TransportFactory};
