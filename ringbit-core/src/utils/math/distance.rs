//! Ultrasonic echo conversion for the Ring:bit sonar module.
//!
//! The sensor reports the round-trip echo width in microseconds. Sound covers
//! roughly 34 cm per millisecond, so one way is `width * 34 / 2 / 1000` cm. The
//! module also reads about 7 cm short, which is added back as a fixed offset.
//!
//! # Example
//! ```rust
//! use ringbit_core::utils::math::distance::{echo_to_cm, Unit};
//! let cm = echo_to_cm(1000);
//! assert_eq!(cm, 24.0);
//! assert_eq!(Unit::Centimeters.from_cm(cm), 24.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::Error;

/// Speed of sound, in centimeters per millisecond.
const SOUND_CM_PER_MS: f32 = 34.0;
/// Sensor-specific calibration offset (cm).
const ECHO_OFFSET_CM: f32 = 7.0;
const CM_PER_INCH: f32 = 2.54;

/// Output scale for distance queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "inch")]
    Inches,
}

impl Unit {
    /// Raw code used for centimeters by the MicroPython/CircuitPython drivers.
    pub const CM_CODE: u8 = 1;
    /// Raw code used for inches.
    pub const INCH_CODE: u8 = 2;

    /// Scale a centimeter value into this unit.
    pub fn from_cm(
        self,
        cm: f32,
    ) -> f32 {
        match self {
            Unit::Centimeters => cm,
            Unit::Inches => cm / CM_PER_INCH,
        }
    }
}

impl TryFrom<u8> for Unit {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            Unit::CM_CODE => Ok(Unit::Centimeters),
            Unit::INCH_CODE => Ok(Unit::Inches),
            other => Err(Error::InvalidUnit(other)),
        }
    }
}

/// Convert a round-trip echo width (µs) into centimeters, offset included.
pub fn echo_to_cm(width_us: u16) -> f32 {
    width_us as f32 * SOUND_CM_PER_MS / 2.0 / 1000.0 + ECHO_OFFSET_CM
}
