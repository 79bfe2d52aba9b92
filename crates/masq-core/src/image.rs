//! Display-state image tokens

use serde::{Deserialize, Serialize};

/// Icon the host shows next to a masquerade device's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateImage {
    NoImage,
    MotionSensor,
    MotionSensorTripped,
    PowerOn,
    PowerOff,
    TemperatureSensor,
    HumiditySensor,
    LightSensor,
    EnergyMeterOn,
}
