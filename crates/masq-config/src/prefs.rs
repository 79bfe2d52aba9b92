//! Contents of `masquerade.yaml`

use std::collections::BTreeMap;

use masq_core::{Binding, DeviceId, DeviceSnapshot};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{LoadError, LoadResult};
use crate::props::{binding_from_props, Props};

/// Plugin log level preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// An upstream plugin known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// One masquerade device as stored by the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BindingConfig {
    /// Masquerade device id
    pub id: DeviceId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Device type id (`masqSensor`, `masqDimmer`, ...)
    #[serde(rename = "type")]
    pub type_id: String,

    /// Stored properties; scalars of any YAML type
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
}

impl BindingConfig {
    /// Stored properties normalized to strings, the way the host keeps them
    pub fn props(&self) -> Props {
        self.props
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect()
    }

    /// Convert into a typed binding
    pub fn to_binding(&self) -> LoadResult<Binding> {
        binding_from_props(self.id, &self.name, &self.type_id, &self.props()).map_err(|source| {
            LoadError::InvalidBinding {
                name: self.display_name(),
                source,
            }
        })
    }

    fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_yaml::to_string(value)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

/// The whole configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasqueradeConfig {
    /// Plugin preference: log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Upstream plugins known to the host
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,

    /// Initial device snapshots known to the host
    #[serde(default)]
    pub devices: Vec<DeviceSnapshot>,

    /// Masquerade devices
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl MasqueradeConfig {
    /// Parse from an already loaded YAML value
    pub fn from_yaml(yaml: Value) -> LoadResult<Self> {
        if !yaml.is_mapping() && !yaml.is_null() {
            return Err(LoadError::InvalidValue {
                key: "root".to_string(),
                reason: "configuration must be a mapping".to_string(),
            });
        }
        if yaml.is_null() {
            return Ok(Self::default());
        }

        serde_yaml::from_value(yaml).map_err(|e| LoadError::InvalidValue {
            key: "root".to_string(),
            reason: e.to_string(),
        })
    }

    /// Convert every masquerade device into a binding
    ///
    /// Fails on the first invalid device, naming it.
    pub fn bindings(&self) -> LoadResult<Vec<Binding>> {
        self.bindings.iter().map(BindingConfig::to_binding).collect()
    }
}
