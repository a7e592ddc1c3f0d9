//! Bridge between upstream MCP servers and the host's tool registry.
//!
//! Each configured MCP server is connected over its declared transport, its
//! tools are discovered and republished to the host as one tool group whose
//! members carry namespaced names. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
