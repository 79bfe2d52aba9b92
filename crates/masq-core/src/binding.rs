//! Typed configuration of one masquerade device

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DeviceId;

/// Stored value of the "standard commands" route
pub const STANDARD_COMMANDS: &str = "---";

/// The configuration linking one masquerade device to its base device
///
/// A binding is built once from the host's stored properties and never
/// changes afterwards: editing a masquerade device in the host results in an
/// unregister followed by a fresh registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// The synthetic device presenting translated state
    pub masquerade_id: DeviceId,

    /// Display name of the masquerade device (used in logs)
    pub name: String,

    /// The real device being mirrored
    pub base_device_id: DeviceId,

    /// Per-kind translation rules
    pub kind: BindingKind,
}

impl Binding {
    /// Create a new binding
    pub fn new(
        masquerade_id: DeviceId,
        name: impl Into<String>,
        base_device_id: DeviceId,
        kind: BindingKind,
    ) -> Self {
        Self {
            masquerade_id,
            name: name.into(),
            base_device_id,
            kind,
        }
    }
}

/// Translation rules, one variant per masquerade device type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindingKind {
    Sensor(SensorBinding),
    ValueSensor(ValueSensorBinding),
    Dimmer(DimmerBinding),
    SpeedControl(SpeedControlBinding),
    Sprinkler,
}

impl BindingKind {
    /// The host's device type id for this kind
    pub fn type_id(&self) -> &'static str {
        match self {
            BindingKind::Sensor(_) => "masqSensor",
            BindingKind::ValueSensor(_) => "masqValueSensor",
            BindingKind::Dimmer(_) => "masqDimmer",
            BindingKind::SpeedControl(_) => "masqSpeedControl",
            BindingKind::Sprinkler => "masqSprinkler",
        }
    }

    /// The upstream state field this kind watches, if it watches a named field
    ///
    /// SpeedControl and Sprinkler watch built-in properties instead.
    pub fn watched_state_key(&self) -> Option<&str> {
        match self {
            BindingKind::Sensor(b) => Some(&b.watched_state_key),
            BindingKind::ValueSensor(b) => Some(&b.watched_state_key),
            BindingKind::Dimmer(b) => Some(&b.watched_state_key),
            BindingKind::SpeedControl(_) | BindingKind::Sprinkler => None,
        }
    }
}

/// On/off sensor driven by a string match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorBinding {
    pub watched_state_key: String,
    pub subtype: SensorSubtype,
    pub match_rule: MatchRule,
}

/// Numeric sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSensorBinding {
    pub watched_state_key: String,
    pub subtype: ValueSubtype,
}

/// Dimmer with scaling in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimmerBinding {
    pub watched_state_key: String,
    /// Upstream state range mapped onto 0-100
    pub state_scale: ScaleRange,
    /// 0-100 mapped onto the upstream action's input range
    pub action_scale: ScaleRange,
    pub value_format: ValueFormat,
    pub route: CommandRoute,
}

/// Speed control mirroring the base device's level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedControlBinding {
    /// Multiplier turning a speed index into an upstream level
    pub scale_factor: i64,
}

/// Comparison rule for Sensor bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub match_string: String,
    #[serde(default)]
    pub reverse: bool,
}

/// A bounded integer range with optional axis reversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub low: i64,
    pub high: i64,
    #[serde(default)]
    pub reverse: bool,
}

impl ScaleRange {
    pub fn new(low: i64, high: i64, reverse: bool) -> Self {
        Self { low, high, reverse }
    }
}

/// Where commands against a Dimmer binding are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum CommandRoute {
    /// Generic on/off calls on the base device
    Standard,
    /// A named action of the plugin owning the base device
    Action {
        plugin_id: String,
        action_id: String,
        /// Action input field receiving the value, if any
        value_field: Option<String>,
    },
}

/// Presentation of Sensor bindings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorSubtype {
    Generic,
    MotionSensor,
    Power,
    Unrecognized(String),
}

impl SensorSubtype {
    pub fn as_str(&self) -> &str {
        match self {
            SensorSubtype::Generic => "Generic",
            SensorSubtype::MotionSensor => "MotionSensor",
            SensorSubtype::Power => "Power",
            SensorSubtype::Unrecognized(name) => name,
        }
    }
}

impl From<&str> for SensorSubtype {
    fn from(s: &str) -> Self {
        match s {
            "Generic" => SensorSubtype::Generic,
            "MotionSensor" => SensorSubtype::MotionSensor,
            "Power" => SensorSubtype::Power,
            other => SensorSubtype::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for SensorSubtype {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<SensorSubtype> for String {
    fn from(subtype: SensorSubtype) -> Self {
        subtype.as_str().to_string()
    }
}

impl fmt::Display for SensorSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation of ValueSensor bindings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueSubtype {
    Generic,
    TemperatureF,
    TemperatureC,
    Humidity,
    Luminance,
    LuminancePercent,
    Energy,
    Ppm,
    Unrecognized(String),
}

impl ValueSubtype {
    pub fn as_str(&self) -> &str {
        match self {
            ValueSubtype::Generic => "Generic",
            ValueSubtype::TemperatureF => "Temperature-F",
            ValueSubtype::TemperatureC => "Temperature-C",
            ValueSubtype::Humidity => "Humidity",
            ValueSubtype::Luminance => "Luminance",
            ValueSubtype::LuminancePercent => "Luminance%",
            ValueSubtype::Energy => "Energy",
            ValueSubtype::Ppm => "ppm",
            ValueSubtype::Unrecognized(name) => name,
        }
    }
}

impl From<&str> for ValueSubtype {
    fn from(s: &str) -> Self {
        match s {
            "Generic" => ValueSubtype::Generic,
            "Temperature-F" => ValueSubtype::TemperatureF,
            "Temperature-C" => ValueSubtype::TemperatureC,
            "Humidity" => ValueSubtype::Humidity,
            // Older releases stored the misspelled names
            "Luminance" | "Luminence" => ValueSubtype::Luminance,
            "Luminance%" | "Luminence%" => ValueSubtype::LuminancePercent,
            "Energy" => ValueSubtype::Energy,
            "ppm" => ValueSubtype::Ppm,
            other => ValueSubtype::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for ValueSubtype {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ValueSubtype> for String {
    fn from(subtype: ValueSubtype) -> Self {
        subtype.as_str().to_string()
    }
}

impl fmt::Display for ValueSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoding of values sent to upstream actions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueFormat {
    Decimal,
    Hexadecimal,
    Octal,
    Unrecognized(String),
}

impl ValueFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ValueFormat::Decimal => "Decimal",
            ValueFormat::Hexadecimal => "Hexadecimal",
            ValueFormat::Octal => "Octal",
            ValueFormat::Unrecognized(name) => name,
        }
    }
}

impl From<&str> for ValueFormat {
    fn from(s: &str) -> Self {
        match s {
            "Decimal" => ValueFormat::Decimal,
            "Hexadecimal" => ValueFormat::Hexadecimal,
            "Octal" => ValueFormat::Octal,
            other => ValueFormat::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for ValueFormat {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ValueFormat> for String {
    fn from(format: ValueFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
