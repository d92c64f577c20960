//! Conversion of raw byte counts to display units.

use memsight_common::Unit;

use crate::config::ConfigError;

const KILO: f64 = 1024.0;
const MEGA: f64 = 1024.0 * 1024.0;
const GIGA: f64 = 1024.0 * 1024.0 * 1024.0;

/// Convert a raw value to `unit`.
///
/// `Bytes` and `Percent` are returned unconverted. Byte multiples use
/// floating-point division, so fractional units are kept (250 bytes is
/// 0.244140625 kilobytes).
pub fn convert(unit: Unit, raw: u64) -> f64 {
    let raw = raw as f64;
    match unit {
        Unit::Bytes | Unit::Percent => raw,
        Unit::Kilobytes => raw / KILO,
        Unit::Megabytes => raw / MEGA,
        Unit::Gigabytes => raw / GIGA,
    }
}

/// Parse the unit token used for byte-valued metrics.
///
/// Accepts exactly `bytes`, `kilobytes`, `megabytes` and `gigabytes`.
pub fn parse_memory_unit(token: &str) -> Result<Unit, ConfigError> {
    match token {
        "bytes" => Ok(Unit::Bytes),
        "kilobytes" => Ok(Unit::Kilobytes),
        "megabytes" => Ok(Unit::Megabytes),
        "gigabytes" => Ok(Unit::Gigabytes),
        other => Err(ConfigError::InvalidUnit(other.to_string())),
    }
}
