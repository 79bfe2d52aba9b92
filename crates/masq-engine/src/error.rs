//! Engine error type

use masq_core::{Command, ConfigError, DeviceId, HostError};
use thiserror::Error;

use crate::registry::InvalidTransition;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures scoped to one binding's one event
///
/// Nothing here is fatal: the engine logs the error and moves on to the next
/// notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or contradictory configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transient failure reported by the host
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("masquerade device {0} is not registered")]
    NotRegistered(DeviceId),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The base device snapshot lacks the state the binding watches
    #[error("device {device} has no state '{key}'")]
    MissingState { device: DeviceId, key: String },

    #[error("{kind} device {device} does not support '{command}'")]
    UnsupportedCommand {
        device: DeviceId,
        kind: &'static str,
        command: Command,
    },
}

impl EngineError {
    /// Whether this is operator-facing misconfiguration (logged as an error)
    /// rather than a transient condition (logged as a warning)
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            EngineError::Config(_) | EngineError::UnsupportedCommand { .. }
        )
    }
}
