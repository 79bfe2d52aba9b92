//! Commands addressed to masquerade devices

use serde::{Deserialize, Serialize};
use std::fmt;

/// A command-of-intent issued against a masquerade device
///
/// Commands are grouped by the device family the host routes them through:
/// relay/dimmer actions, speed control actions and sprinkler actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", content = "action", rename_all = "snake_case")]
pub enum Command {
    /// Relay and dimmer actions
    Device(DeviceAction),
    /// Speed control actions
    Speed(SpeedAction),
    /// Sprinkler actions
    Sprinkler(SprinklerAction),
}

/// Relay and dimmer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DeviceAction {
    TurnOn,
    TurnOff,
    /// Set the 0-100 level
    SetBrightness(i64),
    Toggle,
    RequestStatus,
}

/// Speed control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SpeedAction {
    /// Select a discrete speed index
    SetSpeedIndex(i64),
}

/// Sprinkler actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SprinklerAction {
    ZoneOn,
    AllZonesOff,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Device(DeviceAction::TurnOn) => write!(f, "turn on"),
            Command::Device(DeviceAction::TurnOff) => write!(f, "turn off"),
            Command::Device(DeviceAction::SetBrightness(v)) => write!(f, "set brightness to {}", v),
            Command::Device(DeviceAction::Toggle) => write!(f, "toggle"),
            Command::Device(DeviceAction::RequestStatus) => write!(f, "request status"),
            Command::Speed(SpeedAction::SetSpeedIndex(i)) => write!(f, "set speed index to {}", i),
            Command::Sprinkler(SprinklerAction::ZoneOn) => write!(f, "zone on"),
            Command::Sprinkler(SprinklerAction::AllZonesOff) => write!(f, "all zones off"),
        }
    }
}
