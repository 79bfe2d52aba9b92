//! Capabilities the host must provide
//!
//! The translation engine never talks to the host's object model directly.
//! Everything it needs goes through three narrow traits:
//!
//! - [`DeviceLookup`] - read device snapshots and plugin status
//! - [`ActionInvoker`] - drive the base device
//! - [`StateReporter`] - publish translated state on the masquerade device
//!
//! Calls are synchronous and expected to return promptly or fail fast.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DeviceId, DeviceSnapshot, StateImage};

/// Field/value payload passed to a plugin action
pub type ActionProps = BTreeMap<String, String>;

/// Transient failures reported by the host
///
/// None of these are retried by the engine; the affected event or command
/// is dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error("plugin '{0}' not found")]
    PluginNotFound(String),

    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// A single state write on a masquerade device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// State key (e.g. "onOffState")
    pub key: String,

    /// New value
    pub value: serde_json::Value,

    /// Number of decimal places the host should display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,

    /// Preformatted display string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_value: Option<String>,
}

impl StateUpdate {
    /// Create a plain state write
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            decimal_places: None,
            ui_value: None,
        }
    }

    /// Set the displayed precision
    pub fn with_decimal_places(mut self, places: u8) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Set the display string
    pub fn with_ui_value(mut self, ui_value: impl Into<String>) -> Self {
        self.ui_value = Some(ui_value.into());
        self
    }
}

/// Read access to host devices and plugins
pub trait DeviceLookup: Send + Sync {
    /// Fetch the current snapshot of a device
    fn device(&self, id: DeviceId) -> Result<DeviceSnapshot, HostError>;

    /// Whether a plugin is installed and enabled
    fn plugin_enabled(&self, plugin_id: &str) -> Result<bool, HostError>;
}

/// Commands sent to base devices
pub trait ActionInvoker: Send + Sync {
    /// Generic turn-on of a device
    fn turn_on(&self, device: DeviceId) -> Result<(), HostError>;

    /// Generic turn-off of a device
    fn turn_off(&self, device: DeviceId) -> Result<(), HostError>;

    /// Generic level set of a dimmable device
    fn set_brightness(&self, device: DeviceId, value: i64) -> Result<(), HostError>;

    /// Run a named plugin action against a device
    fn execute_action(
        &self,
        plugin_id: &str,
        action_id: &str,
        device: DeviceId,
        props: ActionProps,
    ) -> Result<(), HostError>;
}

/// Writes to masquerade devices
pub trait StateReporter: Send + Sync {
    /// Write one state value
    fn update_state(&self, device: DeviceId, update: StateUpdate) -> Result<(), HostError>;

    /// Change the displayed state image
    fn update_image(&self, device: DeviceId, image: StateImage) -> Result<(), HostError>;

    /// Enable or disable a device at the host level
    fn set_enabled(&self, device: DeviceId, enabled: bool) -> Result<(), HostError>;
}
