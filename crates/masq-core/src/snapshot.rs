//! Snapshot of a host device's state

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// The state of a host device at a point in time
///
/// Snapshots are what the host hands over on every change notification: one
/// for the state before the change and one for the state after. Besides the
/// named state fields, devices may expose the two built-in properties the
/// host tracks for every relay and dimmer: the on/off state and the generic
/// level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// The device this snapshot belongs to
    pub id: DeviceId,

    /// Display name of the device
    #[serde(default)]
    pub name: String,

    /// Plugin that owns the device, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,

    /// Whether the device is enabled at the host level
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Built-in on/off property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_state: Option<bool>,

    /// Built-in generic level property (0-100 on dimmers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,

    /// Named state fields
    #[serde(default)]
    pub states: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl DeviceSnapshot {
    /// Create an empty, enabled snapshot for a device
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            plugin_id: None,
            enabled: true,
            on_state: None,
            brightness: None,
            states: HashMap::new(),
        }
    }

    /// Set a named state field
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.states.insert(key.into(), value.into());
        self
    }

    /// Set the built-in on/off property
    pub fn with_on_state(mut self, on: bool) -> Self {
        self.on_state = Some(on);
        self
    }

    /// Set the built-in level property
    pub fn with_brightness(mut self, level: i64) -> Self {
        self.brightness = Some(level);
        self
    }

    /// Set the owning plugin
    pub fn with_plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_id = Some(plugin_id.into());
        self
    }

    /// Get a named state field
    pub fn state(&self, key: &str) -> Option<&serde_json::Value> {
        self.states.get(key)
    }
}
