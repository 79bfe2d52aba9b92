//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use masq_config::{binding_from_props, keys, Props};
use masq_core::{Binding, DeviceId, DeviceSnapshot};
use masq_engine::TranslationEngine;
use masq_host::MemoryHost;

pub const BASE: u64 = 101;
pub const PLUGIN: &str = "com.example.zwave";

pub fn id(raw: u64) -> DeviceId {
    DeviceId::new(raw)
}

/// A host with one enabled plugin and an engine over it
pub fn setup() -> (Arc<MemoryHost>, TranslationEngine) {
    let host = Arc::new(MemoryHost::new());
    host.set_plugin(PLUGIN, true);
    let engine = TranslationEngine::with_host(host.clone());
    (host, engine)
}

pub fn base_device() -> DeviceSnapshot {
    DeviceSnapshot::new(id(BASE), "Base Device").with_plugin(PLUGIN)
}

/// Build a binding the way the host stores it
pub fn binding(masquerade_id: u64, type_id: &str, props: Props) -> Binding {
    binding_from_props(
        id(masquerade_id),
        &format!("Masquerade {}", masquerade_id),
        type_id,
        &props.with(keys::BASE_DEVICE, BASE.to_string()),
    )
    .unwrap()
}

pub fn motion_sensor(masquerade_id: u64) -> Binding {
    binding(
        masquerade_id,
        "masqSensor",
        Props::new()
            .with(keys::STATE, "motion")
            .with(keys::SENSOR_SUBTYPE, "MotionSensor")
            .with(keys::MATCH_STRING, "true"),
    )
}

/// Dimmer over a 0-255 `level` state
pub fn dimmer_props() -> Props {
    Props::new()
        .with(keys::STATE, "level")
        .with(keys::LOW_LIMIT_STATE, "0")
        .with(keys::HIGH_LIMIT_STATE, "255")
}

/// Dimmer routed through a plugin action with a 0-200 reversed hex input
pub fn action_dimmer_props() -> Props {
    dimmer_props()
        .with(keys::LOW_LIMIT_ACTION, "0")
        .with(keys::HIGH_LIMIT_ACTION, "200")
        .with(keys::REVERSE_ACTION, "true")
        .with(keys::VALUE_FORMAT, "Hexadecimal")
        .with(keys::DEVICE_PLUGIN, PLUGIN)
        .with(keys::ACTION, "setLevel")
        .with(keys::VALUE_FIELD, "level")
}

/// Apply a new snapshot to the host and hand the change to the engine
pub fn change(host: &MemoryHost, engine: &TranslationEngine, snapshot: DeviceSnapshot) -> usize {
    let previous = host.apply_snapshot(snapshot.clone());
    engine.on_upstream_change(previous.as_ref(), &snapshot)
}
