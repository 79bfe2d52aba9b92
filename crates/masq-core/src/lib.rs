//! Core types for Masquerade
//!
//! This crate provides the fundamental types shared by every other crate in
//! the workspace: device identifiers and snapshots, the typed [`Binding`]
//! describing one masquerade device, the commands a masquerade device can
//! receive, and the capability traits the host must provide.

mod binding;
mod command;
mod device_id;
mod error;
pub mod host;
mod image;
mod snapshot;

pub use binding::{
    Binding, BindingKind, CommandRoute, DimmerBinding, MatchRule, ScaleRange, SensorBinding,
    SensorSubtype, SpeedControlBinding, ValueFormat, ValueSensorBinding, ValueSubtype,
    STANDARD_COMMANDS,
};
pub use command::{Command, DeviceAction, SpeedAction, SprinklerAction};
pub use device_id::{DeviceId, DeviceIdError};
pub use error::ConfigError;
pub use host::{ActionInvoker, ActionProps, DeviceLookup, HostError, StateReporter, StateUpdate};
pub use image::StateImage;
pub use snapshot::DeviceSnapshot;

/// Well-known state keys reported on masquerade devices
pub mod states {
    /// Boolean state of Sensor bindings
    pub const ON_OFF_STATE: &str = "onOffState";

    /// Numeric state of ValueSensor bindings
    pub const SENSOR_VALUE: &str = "sensorValue";

    /// 0-100 level of Dimmer bindings
    pub const BRIGHTNESS_LEVEL: &str = "brightnessLevel";

    /// Level of SpeedControl bindings
    pub const SPEED_LEVEL: &str = "speedLevel";

    /// Active zone indicator of Sprinkler bindings
    pub const ACTIVE_ZONE: &str = "activeZone";
}
