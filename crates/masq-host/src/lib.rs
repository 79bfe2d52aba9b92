//! In-memory host for Masquerade
//!
//! [`MemoryHost`] keeps device snapshots, plugin status and everything the
//! engine reports about masquerade devices in memory. The `masquerade` binary
//! drives it from JSON lines; tests use it as the capability test double.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use masq_core::{
    ActionInvoker, ActionProps, DeviceId, DeviceLookup, DeviceSnapshot, HostError, StateImage,
    StateReporter, StateUpdate,
};
use serde::Serialize;
use tracing::{debug, instrument, trace};

/// One state value reported on a masquerade device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedState {
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_value: Option<String>,
    /// When the value last changed
    pub last_changed: DateTime<Utc>,
    /// When the value was last written
    pub last_updated: DateTime<Utc>,
}

/// Everything reported about one masquerade device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedDevice {
    pub states: BTreeMap<String, ReportedState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<StateImage>,
    pub enabled: bool,
    /// Number of times the device was disabled
    pub disable_count: usize,
}

impl Default for ReportedDevice {
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
            image: None,
            enabled: true,
            disable_count: 0,
        }
    }
}

/// A call made on a base device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Invocation {
    TurnOn {
        device: DeviceId,
    },
    TurnOff {
        device: DeviceId,
    },
    SetBrightness {
        device: DeviceId,
        value: i64,
    },
    ExecuteAction {
        plugin_id: String,
        action_id: String,
        device: DeviceId,
        props: ActionProps,
    },
}

/// Host state held in memory
pub struct MemoryHost {
    devices: DashMap<DeviceId, DeviceSnapshot>,
    plugins: DashMap<String, bool>,
    reported: DashMap<DeviceId, ReportedDevice>,
    invocations: Mutex<Vec<Invocation>>,
    online: AtomicBool,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            plugins: DashMap::new(),
            reported: DashMap::new(),
            invocations: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    // ===== Fixtures =====

    /// Store a device snapshot, returning the one it replaces
    #[instrument(skip(self, snapshot), fields(device_id = %snapshot.id))]
    pub fn apply_snapshot(&self, snapshot: DeviceSnapshot) -> Option<DeviceSnapshot> {
        let previous = self.devices.insert(snapshot.id, snapshot);
        debug!(replaced = previous.is_some(), "Stored device snapshot");
        previous
    }

    /// Remove a device, returning its last snapshot
    pub fn remove_device(&self, id: DeviceId) -> Option<DeviceSnapshot> {
        self.devices.remove(&id).map(|(_, snapshot)| snapshot)
    }

    /// Install or update a plugin
    pub fn set_plugin(&self, plugin_id: impl Into<String>, enabled: bool) {
        self.plugins.insert(plugin_id.into(), enabled);
    }

    /// Simulate the host going away; every call fails with `Unavailable`
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    // ===== Queries =====

    /// Current snapshot of a device
    pub fn snapshot(&self, id: DeviceId) -> Option<DeviceSnapshot> {
        self.devices.get(&id).map(|s| s.clone())
    }

    /// Everything reported about a masquerade device
    pub fn reported(&self, id: DeviceId) -> Option<ReportedDevice> {
        self.reported.get(&id).map(|r| r.clone())
    }

    /// A reported state value
    pub fn state(&self, id: DeviceId, key: &str) -> Option<serde_json::Value> {
        self.reported
            .get(&id)
            .and_then(|r| r.states.get(key).map(|s| s.value.clone()))
    }

    /// The reported state image
    pub fn image(&self, id: DeviceId) -> Option<StateImage> {
        self.reported.get(&id).and_then(|r| r.image)
    }

    /// Whether a device is enabled (devices are enabled until disabled)
    pub fn enabled(&self, id: DeviceId) -> bool {
        self.reported.get(&id).map(|r| r.enabled).unwrap_or(true)
    }

    /// Number of times a device was disabled
    pub fn disable_count(&self, id: DeviceId) -> usize {
        self.reported.get(&id).map(|r| r.disable_count).unwrap_or(0)
    }

    /// All reports, keyed by device
    pub fn reports(&self) -> BTreeMap<DeviceId, ReportedDevice> {
        self.reported
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    /// Calls made on base devices, oldest first
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn check_online(&self) -> Result<(), HostError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HostError::Unavailable("host offline".to_string()))
        }
    }

    fn invoke(&self, device: DeviceId, invocation: Invocation) -> Result<(), HostError> {
        self.check_online()?;
        if !self.devices.contains_key(&device) {
            return Err(HostError::DeviceNotFound(device));
        }
        debug!(?invocation, "Base device call");
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(invocation);
        Ok(())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLookup for MemoryHost {
    fn device(&self, id: DeviceId) -> Result<DeviceSnapshot, HostError> {
        self.check_online()?;
        self.snapshot(id).ok_or(HostError::DeviceNotFound(id))
    }

    fn plugin_enabled(&self, plugin_id: &str) -> Result<bool, HostError> {
        self.check_online()?;
        self.plugins
            .get(plugin_id)
            .map(|enabled| *enabled)
            .ok_or_else(|| HostError::PluginNotFound(plugin_id.to_string()))
    }
}

impl ActionInvoker for MemoryHost {
    fn turn_on(&self, device: DeviceId) -> Result<(), HostError> {
        self.invoke(device, Invocation::TurnOn { device })
    }

    fn turn_off(&self, device: DeviceId) -> Result<(), HostError> {
        self.invoke(device, Invocation::TurnOff { device })
    }

    fn set_brightness(&self, device: DeviceId, value: i64) -> Result<(), HostError> {
        self.invoke(device, Invocation::SetBrightness { device, value })
    }

    fn execute_action(
        &self,
        plugin_id: &str,
        action_id: &str,
        device: DeviceId,
        props: ActionProps,
    ) -> Result<(), HostError> {
        if !self.plugins.contains_key(plugin_id) {
            return Err(HostError::PluginNotFound(plugin_id.to_string()));
        }
        self.invoke(
            device,
            Invocation::ExecuteAction {
                plugin_id: plugin_id.to_string(),
                action_id: action_id.to_string(),
                device,
                props,
            },
        )
    }
}

impl StateReporter for MemoryHost {
    #[instrument(skip(self, update), fields(device_id = %device, key = %update.key))]
    fn update_state(&self, device: DeviceId, update: StateUpdate) -> Result<(), HostError> {
        self.check_online()?;
        let now = Utc::now();
        let mut report = self.reported.entry(device).or_default();

        let last_changed = match report.states.get(&update.key) {
            Some(existing) if existing.value == update.value => existing.last_changed,
            _ => now,
        };
        trace!(value = %update.value, "Reporting state");

        report.states.insert(
            update.key,
            ReportedState {
                value: update.value,
                decimal_places: update.decimal_places,
                ui_value: update.ui_value,
                last_changed,
                last_updated: now,
            },
        );
        Ok(())
    }

    fn update_image(&self, device: DeviceId, image: StateImage) -> Result<(), HostError> {
        self.check_online()?;
        self.reported.entry(device).or_default().image = Some(image);
        Ok(())
    }

    fn set_enabled(&self, device: DeviceId, enabled: bool) -> Result<(), HostError> {
        self.check_online()?;
        let mut report = self.reported.entry(device).or_default();
        report.enabled = enabled;
        if !enabled {
            report.disable_count += 1;
        }
        debug!(device_id = %device, enabled, "Device enablement changed");
        Ok(())
    }
}
