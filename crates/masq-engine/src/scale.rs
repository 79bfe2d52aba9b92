//! Linear scaling between an upstream range and 0-100
//!
//! Reads clamp out-of-range values (upstream devices occasionally report
//! outside their documented range); writes trust the 0-100 input.

use masq_core::{ConfigError, ScaleRange};

/// Which limit a value was clamped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    Low,
    High,
}

/// Result of scaling an upstream value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaled {
    /// Scaled value in 0..=100
    pub value: i64,
    /// Set when the input was outside the range
    pub clamped: Option<Clamp>,
}

fn width(range: &ScaleRange) -> Result<i128, ConfigError> {
    if range.high <= range.low {
        return Err(ConfigError::EmptyRange {
            low: range.low,
            high: range.high,
        });
    }
    // Any pair of i64 limits fits in i128
    Ok(i128::from(range.high) - i128::from(range.low))
}

/// Map an upstream value onto 0..=100
pub fn to_downstream(value: i64, range: &ScaleRange) -> Result<Scaled, ConfigError> {
    let width = width(range)?;

    let (value, clamped) = if value < range.low {
        (range.low, Some(Clamp::Low))
    } else if value > range.high {
        (range.high, Some(Clamp::High))
    } else {
        (value, None)
    };

    let offset = i128::from(value) - i128::from(range.low);
    let scaled = (offset as f64 * 100.0 / width as f64).round() as i64;
    let value = if range.reverse { 100 - scaled } else { scaled };

    Ok(Scaled { value, clamped })
}

/// Map a 0..=100 value onto the upstream range
///
/// Values above 100 are passed through unclamped and may land outside the
/// range; a result that no longer fits an i64 is a `ScaleOverflow`.
pub fn to_upstream(value: i64, range: &ScaleRange) -> Result<i64, ConfigError> {
    let width = width(range)?;
    let low = i128::from(range.low);

    let raw = (value as f64 * width as f64 / 100.0).round() as i128 + low;
    let raw = if range.reverse {
        i128::from(range.high) - (raw - low)
    } else {
        raw
    };

    i64::try_from(raw).map_err(|_| ConfigError::ScaleOverflow {
        value,
        low: range.low,
        high: range.high,
    })
}
