//! Configuration error shared by binding conversion and translation

use thiserror::Error;

/// Malformed or contradictory binding configuration
///
/// Raised either when stored properties are converted into a [`Binding`]
/// (rejecting the registration) or while translating a single event (aborting
/// only that event).
///
/// [`Binding`]: crate::Binding
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required property is absent or empty
    #[error("missing property '{key}'")]
    MissingProperty { key: String },

    /// A property could not be interpreted
    #[error("invalid value '{value}' for property '{key}': {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    /// The device type id is not one of the masquerade device types
    #[error("unknown masquerade device type '{0}'")]
    UnknownDeviceType(String),

    /// A scaling range with no width (or inverted limits)
    #[error("scaling range {low}..{high} is empty (low limit must be below high limit)")]
    EmptyRange { low: i64, high: i64 },

    /// A scaled value that does not fit the upstream integer range
    #[error("value {value} does not fit scaling range {low}..{high}")]
    ScaleOverflow { value: i64, low: i64, high: i64 },

    /// A value format other than Decimal, Hexadecimal or Octal
    #[error("unknown value format '{0}'")]
    UnknownFormat(String),

    /// A presentation subtype the presenter does not know
    #[error("unknown sensor subtype '{0}'")]
    UnknownSubtype(String),
}
