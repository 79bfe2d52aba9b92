//! Device identifier shared by base and masquerade devices

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for unparseable device IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceIdError {
    #[error("device id cannot be empty")]
    Empty,

    #[error("device id '{0}' is not a non-negative integer")]
    NotNumeric(String),
}

/// Opaque identifier the host assigns to every device
///
/// IDs are numeric and totally ordered; the order is only used to make
/// fan-out over several bindings reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(u64);

impl DeviceId {
    /// Create a device id from its raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DeviceId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DeviceIdError::Empty);
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| DeviceIdError::NotNumeric(s.to_string()))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
