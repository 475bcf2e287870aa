//! Conversions between raw hardware units and logical values.
//!
//! Logical values are either raw passthrough or a fixed-point percentage
//! in hundredths, so that 100.00% round-trips exactly.

pub use crate::consts::PCT_MAX;

use crate::errors::*;

make_log_macro!(warn, "value");

/// How a value is interpreted on input and rendered on output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueMode {
    /// Raw hardware units.
    Raw,
    /// Linear percentage.
    #[default]
    Percent,
    /// Exponential percentage, tracking perceived brightness.
    PercentExponential,
}

/// Convert a raw hardware value into a logical one.
///
/// Percentages are rounded to the nearest hundredth. `raw == 0` has no
/// logarithm, so the exponential mode maps it to 0%; anything at or
/// above `max` reads as 100%.
pub fn from_raw(mode: ValueMode, raw: u64, max: u64) -> Result<u64> {
    match mode {
        ValueMode::Raw => Ok(raw),
        _ if max == 0 => Err(LumenError::ZeroMaxBrightness),
        ValueMode::Percent => Ok(((raw * PCT_MAX + max / 2) / max).min(PCT_MAX)),
        ValueMode::PercentExponential => {
            if raw == 0 {
                Ok(0)
            } else if raw >= max {
                Ok(PCT_MAX)
            } else {
                let pct = (raw as f64).ln() / (max as f64).ln() * PCT_MAX as f64;
                Ok(pct.round() as u64)
            }
        }
    }
}

/// Convert a logical value back into raw hardware units.
///
/// The linear mode truncates where [`from_raw`] rounds; callers relying
/// on round-trip stability get at most one unit of drift.
pub fn to_raw(mode: ValueMode, val: u64, max: u64) -> u64 {
    match mode {
        ValueMode::Raw => val,
        ValueMode::Percent => (val * max) / PCT_MAX,
        ValueMode::PercentExponential => {
            if max == 0 {
                0
            } else {
                let raw = (val as f64 * (max as f64).ln() / PCT_MAX as f64).exp();
                raw.round() as u64
            }
        }
    }
}

/// Clamp `val` into `[min, max]`, noting any adjustment.
pub fn clamp(val: u64, min: u64, max: u64) -> u64 {
    if val < min {
        warn!("raising value '{val}' to '{min}'");
        min
    } else if val > max {
        warn!("lowering value '{val}' to '{max}'");
        max
    } else {
        val
    }
}

/// Clamp a user-supplied percentage to `[0, 100]`, noting any adjustment.
pub fn clamp_percent(pct: f64) -> f64 {
    if pct < 0.0 {
        warn!("raising specified value {pct}% to 0%");
        0.0
    } else if pct > 100.0 {
        warn!("lowering specified value {pct}% to 100%");
        100.0
    } else {
        pct
    }
}
