//! Plugin configuration surface: the persisted server list and its schema.

use super::{ServerDescriptor, ServerName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Key holding the server list in the plugin configuration object.
const SERVERS_KEY: &str = "servers";

/// Errors raised when the configuration as a whole is malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeConfigError {
    /// The configuration is not a JSON object.
    #[error("MCP bridge configuration must be an object, got {0}")]
    NotAnObject(&'static str),

    /// The `servers` entry is not an array.
    #[error("MCP bridge configuration field 'servers' must be an array, got {0}")]
    ServersNotAnArray(&'static str),
}

/// Validated plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Servers to connect at startup.
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,
}

/// A configured server entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedServer {
    /// Position of the entry in the configured list.
    pub index: usize,
    /// Raw `name` field of the entry, when one could be read.
    pub name: Option<String>,
    /// Validation failure.
    pub reason: String,
}

/// Outcome of loading a configuration: the valid servers plus rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Configuration built from the valid entries.
    pub config: BridgeConfig,
    /// Entries that failed validation, in configured order.
    pub rejected: Vec<RejectedServer>,
}

impl BridgeConfig {
    /// Loads the configuration, validating each server entry on its own.
    ///
    /// A missing or `null` configuration yields an empty server list. One
    /// invalid entry never prevents the remaining entries from loading.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeConfigError`] when the configuration is not an object
    /// or its `servers` field is not an array.
    pub fn load(raw: Option<&Value>) -> Result<LoadedConfig, BridgeConfigError> {
        let Some(entries) = server_entries(raw)? else {
            return Ok(LoadedConfig::default());
        };

        let mut loaded = LoadedConfig::default();
        for (index, entry) in entries.iter().enumerate() {
            match ServerDescriptor::from_value(entry.clone()) {
                Ok(descriptor) => loaded.config.servers.push(descriptor),
                Err(err) => loaded.rejected.push(RejectedServer {
                    index,
                    name: entry_name(entry).map(ToOwned::to_owned),
                    reason: err.to_string(),
                }),
            }
        }
        Ok(loaded)
    }
}

/// Returns `raw` with `descriptor` stored in its server list.
///
/// Entries with the same name are replaced by a single entry appended at the
/// end. Other top-level keys and unrelated entries are left untouched.
///
/// # Errors
///
/// Returns [`BridgeConfigError`] when the stored configuration is malformed.
pub fn with_server_upserted(
    raw: Option<Value>,
    descriptor: &ServerDescriptor,
) -> Result<Value, BridgeConfigError> {
    let mut object = config_object(raw)?;
    let mut servers = take_servers(&mut object)?;
    servers.retain(|entry| entry_name(entry) != Some(descriptor.name().as_str()));
    servers.push(json!(descriptor));
    object.insert(SERVERS_KEY.to_owned(), Value::Array(servers));
    Ok(Value::Object(object))
}

/// Returns `raw` with every server entry named `name` removed.
///
/// # Errors
///
/// Returns [`BridgeConfigError`] when the stored configuration is malformed.
pub fn with_server_removed(
    raw: Option<Value>,
    name: &ServerName,
) -> Result<Value, BridgeConfigError> {
    let mut object = config_object(raw)?;
    let mut servers = take_servers(&mut object)?;
    servers.retain(|entry| entry_name(entry) != Some(name.as_str()));
    object.insert(SERVERS_KEY.to_owned(), Value::Array(servers));
    Ok(Value::Object(object))
}

fn server_entries(raw: Option<&Value>) -> Result<Option<&Vec<Value>>, BridgeConfigError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(object)) => match object.get(SERVERS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(entries)) => Ok(Some(entries)),
            Some(other) => Err(BridgeConfigError::ServersNotAnArray(json_type(other))),
        },
        Some(other) => Err(BridgeConfigError::NotAnObject(json_type(other))),
    }
}

fn config_object(raw: Option<Value>) -> Result<Map<String, Value>, BridgeConfigError> {
    match raw {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(object)) => Ok(object),
        Some(other) => Err(BridgeConfigError::NotAnObject(json_type(&other))),
    }
}

fn take_servers(object: &mut Map<String, Value>) -> Result<Vec<Value>, BridgeConfigError> {
    match object.remove(SERVERS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => Err(BridgeConfigError::ServersNotAnArray(json_type(&other))),
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One field of the configuration schema published to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Configuration key.
    pub name: String,
    /// Field type understood by the host's settings UI.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Short label.
    pub label: String,
    /// Longer help text.
    pub description: String,
    /// Default value.
    pub default: Value,
}

/// Declarative configuration schema published to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    /// Schema title.
    pub title: String,
    /// Schema description.
    pub description: String,
    /// Configurable fields.
    pub fields: Vec<ConfigField>,
}

impl ConfigSchema {
    /// Returns the schema of the bridge plugin configuration.
    #[must_use]
    pub fn bridge() -> Self {
        Self {
            title: "MCP Bridge".to_owned(),
            description: "Connect to MCP servers and expose their tools as A2A tools".to_owned(),
            fields: vec![ConfigField {
                name: SERVERS_KEY.to_owned(),
                field_type: "object".to_owned(),
                label: "MCP Servers (JSON)".to_owned(),
                description:
                    "Array of server configs: [{name, kind, cmd/url, args?, headers?, env?}]"
                        .to_owned(),
                default: json!([]),
            }],
        }
    }
}
