//! Read-only snapshot of one tracked connection.

use super::{ServerName, TransportKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing entry describing one connected server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummary {
    /// Server name.
    pub name: ServerName,
    /// Transport kind.
    pub kind: TransportKind,
    /// Number of tools currently published for the server.
    pub tool_count: usize,
    /// When the current connection was established.
    pub connected_at: DateTime<Utc>,
}
