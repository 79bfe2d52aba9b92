//! Per-subtype presentation of masquerade sensor state

use masq_core::{states, ConfigError, SensorSubtype, StateImage, StateUpdate, ValueSubtype};

/// How a ValueSensor subtype is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuePresentation {
    pub image: StateImage,
    /// None leaves precision and display string to the host
    pub decimal_places: Option<u8>,
    pub suffix: &'static str,
}

impl ValuePresentation {
    const fn new(image: StateImage, decimal_places: u8, suffix: &'static str) -> Self {
        Self {
            image,
            decimal_places: Some(decimal_places),
            suffix,
        }
    }

    /// Display string for a value, if this subtype has one
    pub fn ui_value(&self, value: f64) -> Option<String> {
        self.decimal_places
            .map(|places| format!("{:.*}{}", places as usize, value, self.suffix))
    }

    /// The `sensorValue` write for a value
    pub fn state_update(&self, value: f64) -> StateUpdate {
        let mut update = StateUpdate::new(states::SENSOR_VALUE, value);
        if let Some(places) = self.decimal_places {
            update = update.with_decimal_places(places);
        }
        if let Some(ui_value) = self.ui_value(value) {
            update = update.with_ui_value(ui_value);
        }
        update
    }
}

/// Presentation of a ValueSensor subtype
pub fn present_value(subtype: &ValueSubtype) -> Result<ValuePresentation, ConfigError> {
    use StateImage::*;

    let presentation = match subtype {
        ValueSubtype::Generic => ValuePresentation {
            image: NoImage,
            decimal_places: None,
            suffix: "",
        },
        ValueSubtype::TemperatureF => ValuePresentation::new(TemperatureSensor, 1, " °F"),
        ValueSubtype::TemperatureC => ValuePresentation::new(TemperatureSensor, 1, " °C"),
        ValueSubtype::Humidity => ValuePresentation::new(HumiditySensor, 0, "%"),
        ValueSubtype::Luminance => ValuePresentation::new(LightSensor, 0, " lux"),
        ValueSubtype::LuminancePercent => ValuePresentation::new(LightSensor, 0, "%"),
        ValueSubtype::Energy => ValuePresentation::new(EnergyMeterOn, 0, " watts"),
        ValueSubtype::Ppm => ValuePresentation::new(NoImage, 0, "ppm"),
        ValueSubtype::Unrecognized(name) => return Err(ConfigError::UnknownSubtype(name.clone())),
    };

    Ok(presentation)
}

/// State image of a Sensor subtype for a matched/unmatched state
pub fn present_sensor(subtype: &SensorSubtype, matched: bool) -> Result<StateImage, ConfigError> {
    match subtype {
        SensorSubtype::Generic => Ok(StateImage::NoImage),
        SensorSubtype::MotionSensor if matched => Ok(StateImage::MotionSensorTripped),
        SensorSubtype::MotionSensor => Ok(StateImage::MotionSensor),
        SensorSubtype::Power if matched => Ok(StateImage::PowerOn),
        SensorSubtype::Power => Ok(StateImage::PowerOff),
        SensorSubtype::Unrecognized(name) => Err(ConfigError::UnknownSubtype(name.clone())),
    }
}
