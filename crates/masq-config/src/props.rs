//! Stored device properties and their conversion into bindings

use std::collections::BTreeMap;

use masq_core::{
    Binding, BindingKind, CommandRoute, ConfigError, DeviceId, DimmerBinding, MatchRule,
    ScaleRange, SensorBinding, SensorSubtype, SpeedControlBinding, ValueFormat,
    ValueSensorBinding, ValueSubtype, STANDARD_COMMANDS,
};
use tracing::debug;

/// Property keys used by masquerade devices
pub mod keys {
    pub const BASE_DEVICE: &str = "baseDevice";
    pub const STATE: &str = "masqState";
    pub const SENSOR_SUBTYPE: &str = "masqSensorSubtype";
    pub const MATCH_STRING: &str = "matchString";
    pub const REVERSE_MATCH: &str = "reverse";
    pub const LOW_LIMIT_STATE: &str = "lowLimitState";
    pub const HIGH_LIMIT_STATE: &str = "highLimitState";
    pub const REVERSE_STATE: &str = "reverseState";
    pub const LOW_LIMIT_ACTION: &str = "lowLimitAction";
    pub const HIGH_LIMIT_ACTION: &str = "highLimitAction";
    pub const REVERSE_ACTION: &str = "reverseAction";
    pub const VALUE_FORMAT: &str = "masqValueFormat";
    pub const DEVICE_PLUGIN: &str = "devicePlugin";
    pub const ACTION: &str = "masqAction";
    pub const VALUE_FIELD: &str = "masqValueField";
    pub const SCALE_FACTOR: &str = "scaleFactor";
}

/// Default action-side range when a dimmer only drives standard commands
const DEFAULT_ACTION_LOW: i64 = 0;
const DEFAULT_ACTION_HIGH: i64 = 100;

/// String-keyed properties of one masquerade device, as the host stores them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value that must be present and non-empty
    fn required(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingProperty {
                key: key.to_string(),
            }),
        }
    }

    /// Value that is absent, empty, or the `---` placeholder collapses to None
    fn optional(&self, key: &str) -> Option<&str> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != STANDARD_COMMANDS)
    }

    fn int(&self, key: &str) -> Result<i64, ConfigError> {
        let raw = self.required(key)?;
        parse_int(key, raw)
    }

    fn int_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.get(key).map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_int(key, raw),
            _ => Ok(default),
        }
    }

    /// Checkbox-style flag; absent or empty means false
    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        let Some(raw) = self.get(key).map(str::trim) else {
            return Ok(false);
        };
        match raw.to_ascii_lowercase().as_str() {
            "" | "false" | "no" | "0" => Ok(false),
            "true" | "yes" | "1" => Ok(true),
            _ => Err(ConfigError::InvalidProperty {
                key: key.to_string(),
                value: raw.to_string(),
                reason: "expected a boolean".to_string(),
            }),
        }
    }

    fn device_id(&self, key: &str) -> Result<DeviceId, ConfigError> {
        let raw = self.required(key)?;
        raw.parse().map_err(|e: masq_core::DeviceIdError| ConfigError::InvalidProperty {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

impl FromIterator<(String, String)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidProperty {
        key: key.to_string(),
        value: raw.to_string(),
        reason: "expected an integer".to_string(),
    })
}

/// Convert stored properties into a typed binding
///
/// `type_id` is the host's device type id (`masqSensor`, `masqValueSensor`,
/// `masqDimmer`, `masqSpeedControl` or `masqSprinkler`). Structural problems
/// (missing or non-numeric values) reject the conversion. Subtype and format
/// names are kept even when unrecognized; those are reported when an event
/// actually needs them.
pub fn binding_from_props(
    masquerade_id: DeviceId,
    name: &str,
    type_id: &str,
    props: &Props,
) -> Result<Binding, ConfigError> {
    let base_device_id = props.device_id(keys::BASE_DEVICE)?;

    let kind = match type_id {
        "masqSensor" => BindingKind::Sensor(SensorBinding {
            watched_state_key: props.required(keys::STATE)?.to_string(),
            subtype: SensorSubtype::from(props.get(keys::SENSOR_SUBTYPE).unwrap_or("Generic")),
            match_rule: MatchRule {
                match_string: props
                    .get(keys::MATCH_STRING)
                    .ok_or_else(|| ConfigError::MissingProperty {
                        key: keys::MATCH_STRING.to_string(),
                    })?
                    .to_string(),
                reverse: props.flag(keys::REVERSE_MATCH)?,
            },
        }),
        "masqValueSensor" => BindingKind::ValueSensor(ValueSensorBinding {
            watched_state_key: props.required(keys::STATE)?.to_string(),
            subtype: ValueSubtype::from(props.get(keys::SENSOR_SUBTYPE).unwrap_or("Generic")),
        }),
        "masqDimmer" => BindingKind::Dimmer(dimmer_from_props(props)?),
        "masqSpeedControl" => BindingKind::SpeedControl(SpeedControlBinding {
            scale_factor: props.int(keys::SCALE_FACTOR)?,
        }),
        "masqSprinkler" => BindingKind::Sprinkler,
        other => return Err(ConfigError::UnknownDeviceType(other.to_string())),
    };

    debug!(
        masquerade_id = %masquerade_id,
        base_device_id = %base_device_id,
        type_id,
        "Converted stored properties into binding"
    );

    Ok(Binding::new(masquerade_id, name, base_device_id, kind))
}

fn dimmer_from_props(props: &Props) -> Result<DimmerBinding, ConfigError> {
    let state_scale = ScaleRange::new(
        props.int(keys::LOW_LIMIT_STATE)?,
        props.int(keys::HIGH_LIMIT_STATE)?,
        props.flag(keys::REVERSE_STATE)?,
    );

    let action_scale = ScaleRange::new(
        props.int_or(keys::LOW_LIMIT_ACTION, DEFAULT_ACTION_LOW)?,
        props.int_or(keys::HIGH_LIMIT_ACTION, DEFAULT_ACTION_HIGH)?,
        props.flag(keys::REVERSE_ACTION)?,
    );

    let value_format = props
        .get(keys::VALUE_FORMAT)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ValueFormat::from)
        .unwrap_or(ValueFormat::Decimal);

    let route = match props.optional(keys::ACTION) {
        None => CommandRoute::Standard,
        Some(action_id) => CommandRoute::Action {
            plugin_id: props.required(keys::DEVICE_PLUGIN)?.to_string(),
            action_id: action_id.to_string(),
            value_field: props.optional(keys::VALUE_FIELD).map(str::to_string),
        },
    };

    Ok(DimmerBinding {
        watched_state_key: props.required(keys::STATE)?.to_string(),
        state_scale,
        action_scale,
        value_format,
        route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> DeviceId {
        DeviceId::new(raw)
    }

    fn dimmer_props() -> Props {
        Props::new()
            .with(keys::BASE_DEVICE, "101")
            .with(keys::STATE, "level")
            .with(keys::LOW_LIMIT_STATE, "0")
            .with(keys::HIGH_LIMIT_STATE, "255")
            .with(keys::REVERSE_STATE, "false")
    }

    #[test]
    fn test_sensor_from_props() {
        let props = Props::new()
            .with(keys::BASE_DEVICE, "101")
            .with(keys::STATE, "motion")
            .with(keys::SENSOR_SUBTYPE, "MotionSensor")
            .with(keys::MATCH_STRING, "true")
            .with(keys::REVERSE_MATCH, "True");

        let binding = binding_from_props(id(900), "Hall", "masqSensor", &props).unwrap();
        assert_eq!(binding.base_device_id, id(101));
        match binding.kind {
            BindingKind::Sensor(sensor) => {
                assert_eq!(sensor.watched_state_key, "motion");
                assert_eq!(sensor.subtype, SensorSubtype::MotionSensor);
                assert_eq!(sensor.match_rule.match_string, "true");
                assert!(sensor.match_rule.reverse);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_sensor_allows_empty_match_string() {
        let props = Props::new()
            .with(keys::BASE_DEVICE, "101")
            .with(keys::STATE, "status")
            .with(keys::MATCH_STRING, "");

        let binding = binding_from_props(id(900), "Hall", "masqSensor", &props).unwrap();
        let BindingKind::Sensor(sensor) = binding.kind else {
            panic!("expected sensor");
        };
        assert_eq!(sensor.match_rule.match_string, "");
        assert_eq!(sensor.subtype, SensorSubtype::Generic);
        assert!(!sensor.match_rule.reverse);
    }

    #[test]
    fn test_sensor_requires_match_string() {
        let props = Props::new()
            .with(keys::BASE_DEVICE, "101")
            .with(keys::STATE, "status");

        let err = binding_from_props(id(900), "Hall", "masqSensor", &props).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingProperty {
                key: "matchString".to_string()
            }
        );
    }

    #[test]
    fn test_value_sensor_keeps_legacy_subtype_name() {
        let props = Props::new()
            .with(keys::BASE_DEVICE, "7")
            .with(keys::STATE, "lux")
            .with(keys::SENSOR_SUBTYPE, "Luminence");

        let binding = binding_from_props(id(8), "Lux", "masqValueSensor", &props).unwrap();
        let BindingKind::ValueSensor(sensor) = binding.kind else {
            panic!("expected value sensor");
        };
        assert_eq!(sensor.subtype, ValueSubtype::Luminance);
    }

    #[test]
    fn test_dimmer_standard_route_by_default() {
        let binding = binding_from_props(id(5), "Lamp", "masqDimmer", &dimmer_props()).unwrap();
        let BindingKind::Dimmer(dimmer) = binding.kind else {
            panic!("expected dimmer");
        };
        assert_eq!(dimmer.state_scale, ScaleRange::new(0, 255, false));
        assert_eq!(dimmer.action_scale, ScaleRange::new(0, 100, false));
        assert_eq!(dimmer.value_format, ValueFormat::Decimal);
        assert_eq!(dimmer.route, CommandRoute::Standard);
    }

    #[test]
    fn test_dimmer_standard_commands_sentinel() {
        let props = dimmer_props()
            .with(keys::ACTION, "---")
            .with(keys::DEVICE_PLUGIN, "com.example.zwave");
        let binding = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap();
        let BindingKind::Dimmer(dimmer) = binding.kind else {
            panic!("expected dimmer");
        };
        assert_eq!(dimmer.route, CommandRoute::Standard);
    }

    #[test]
    fn test_dimmer_action_route() {
        let props = dimmer_props()
            .with(keys::DEVICE_PLUGIN, "com.example.zwave")
            .with(keys::ACTION, "setRawLevel")
            .with(keys::VALUE_FIELD, "level")
            .with(keys::LOW_LIMIT_ACTION, "0")
            .with(keys::HIGH_LIMIT_ACTION, "200")
            .with(keys::REVERSE_ACTION, "true")
            .with(keys::VALUE_FORMAT, "Hexadecimal");

        let binding = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap();
        let BindingKind::Dimmer(dimmer) = binding.kind else {
            panic!("expected dimmer");
        };
        assert_eq!(dimmer.action_scale, ScaleRange::new(0, 200, true));
        assert_eq!(dimmer.value_format, ValueFormat::Hexadecimal);
        assert_eq!(
            dimmer.route,
            CommandRoute::Action {
                plugin_id: "com.example.zwave".to_string(),
                action_id: "setRawLevel".to_string(),
                value_field: Some("level".to_string()),
            }
        );
    }

    #[test]
    fn test_dimmer_action_route_without_value_field() {
        let props = dimmer_props()
            .with(keys::DEVICE_PLUGIN, "com.example.zwave")
            .with(keys::ACTION, "toggleScene")
            .with(keys::VALUE_FIELD, "---");

        let binding = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap();
        let BindingKind::Dimmer(dimmer) = binding.kind else {
            panic!("expected dimmer");
        };
        assert!(matches!(
            dimmer.route,
            CommandRoute::Action { value_field: None, .. }
        ));
    }

    #[test]
    fn test_dimmer_action_route_requires_plugin() {
        let props = dimmer_props().with(keys::ACTION, "setRawLevel");
        let err = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingProperty {
                key: "devicePlugin".to_string()
            }
        );
    }

    #[test]
    fn test_dimmer_rejects_non_numeric_limit() {
        let props = dimmer_props().with(keys::HIGH_LIMIT_STATE, "max");
        let err = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProperty { ref key, .. } if key == "highLimitState"));
    }

    #[test]
    fn test_dimmer_keeps_zero_width_range() {
        // Rejected per event by the scaler, not at registration
        let props = dimmer_props().with(keys::HIGH_LIMIT_STATE, "0");
        assert!(binding_from_props(id(5), "Lamp", "masqDimmer", &props).is_ok());
    }

    #[test]
    fn test_speed_control_and_sprinkler() {
        let props = Props::new()
            .with(keys::BASE_DEVICE, "44")
            .with(keys::SCALE_FACTOR, "25");
        let binding = binding_from_props(id(45), "Fan", "masqSpeedControl", &props).unwrap();
        assert_eq!(
            binding.kind,
            BindingKind::SpeedControl(SpeedControlBinding { scale_factor: 25 })
        );

        let props = Props::new().with(keys::BASE_DEVICE, "60");
        let binding = binding_from_props(id(61), "Zone", "masqSprinkler", &props).unwrap();
        assert_eq!(binding.kind, BindingKind::Sprinkler);
    }

    #[test]
    fn test_invalid_flag() {
        let props = dimmer_props().with(keys::REVERSE_STATE, "sometimes");
        let err = binding_from_props(id(5), "Lamp", "masqDimmer", &props).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProperty { ref key, .. } if key == "reverseState"));
    }

    #[test]
    fn test_unknown_type_and_missing_base() {
        let props = Props::new().with(keys::BASE_DEVICE, "1");
        assert_eq!(
            binding_from_props(id(2), "X", "masqThermostat", &props).unwrap_err(),
            ConfigError::UnknownDeviceType("masqThermostat".to_string())
        );

        assert_eq!(
            binding_from_props(id(2), "X", "masqSprinkler", &Props::new()).unwrap_err(),
            ConfigError::MissingProperty {
                key: "baseDevice".to_string()
            }
        );
    }
}
