//! MCP to A2A bridge.
//!
//! This crate connects Model Context Protocol (MCP) servers to an
//! agent-to-agent (A2A) host platform. Tools exposed by each upstream server
//! are republished to the host under a per-server namespace, and other
//! plugins can connect or disconnect servers at runtime.
//!
//! # Architecture
//!
//! The bridge follows hexagonal architecture principles:
//!
//! - **Domain**: Server descriptors, names and tool shapes
//! - **Ports**: Upstream client, transport and host capability traits
//! - **Adapters**: Transport construction, the `rmcp` client and in-memory
//!   implementations
//!
//! # Modules
//!
//! - [`bridge`]: Connection registry, tool adapters and the host plugin
//! - [`logging`]: Structured `tracing` subscriber setup

pub mod bridge;
pub mod logging;
