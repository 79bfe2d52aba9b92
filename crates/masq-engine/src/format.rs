//! Text encoding of values sent to upstream actions

use masq_core::{ConfigError, ValueFormat};

/// Render an integer in the configured format
///
/// Hexadecimal is lowercase and padded to at least two digits; octal carries
/// a `0o` prefix. Negative values keep their sign in front of the digits.
pub fn render(value: i64, format: &ValueFormat) -> Result<String, ConfigError> {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();

    match format {
        ValueFormat::Decimal => Ok(value.to_string()),
        ValueFormat::Hexadecimal => Ok(format!("{}{:02x}", sign, magnitude)),
        ValueFormat::Octal => Ok(format!("{}0o{:o}", sign, magnitude)),
        ValueFormat::Unrecognized(name) => Err(ConfigError::UnknownFormat(name.clone())),
    }
}
