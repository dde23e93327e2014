//! Per-revision calibration for the Ring:bit car.
//!
//! Board revisions differ in ADC scale and sonar timing, so these values are
//! passed to the driver at construction instead of being baked in. Every field
//! has a default, so a JSON file only needs to name what it overrides:
//!
//! ```json
//! { "tracking": [780, 900, 1200], "echo_poll_budget": 8000 }
//! ```

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Ascending analog thresholds separating the four tracking bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[u16; 3]", try_from = "[u16; 3]")]
pub struct TrackingThresholds {
    bands: [u16; 3],
}

impl TrackingThresholds {
    /// Thresholds for 16-bit samples (CircuitPython `AnalogIn.value` scale).
    pub const SIXTEEN_BIT: Self = Self {
        bands: [9600, 15040, 19200],
    };
    /// Thresholds for 12-bit samples.
    pub const TWELVE_BIT: Self = Self {
        bands: [780, 900, 1200],
    };

    /// Build a threshold set. Returns `None` unless strictly ascending.
    pub const fn new(
        dark: u16,
        mid: u16,
        light: u16,
    ) -> Option<Self> {
        if dark < mid && mid < light {
            Some(Self {
                bands: [dark, mid, light],
            })
        } else {
            None
        }
    }

    pub fn bands(&self) -> [u16; 3] {
        self.bands
    }
}

impl Default for TrackingThresholds {
    fn default() -> Self {
        Self::SIXTEEN_BIT
    }
}

impl From<TrackingThresholds> for [u16; 3] {
    fn from(t: TrackingThresholds) -> Self {
        t.bands
    }
}

impl TryFrom<[u16; 3]> for TrackingThresholds {
    type Error = &'static str;

    fn try_from([dark, mid, light]: [u16; 3]) -> Result<Self, Self::Error> {
        Self::new(dark, mid, light).ok_or("tracking thresholds must be strictly ascending")
    }
}

/// Pulse range of a continuous servo and the PWM frame rate driving it.
///
/// Always satisfies `frequency_hz > 0` and `0 < min_pulse_us < max_pulse_us < period`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawServoRange", try_from = "RawServoRange")]
pub struct ServoRange {
    min_pulse_us: f32,
    max_pulse_us: f32,
    frequency_hz: f32,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self {
            min_pulse_us: 750.0,
            max_pulse_us: 2250.0,
            frequency_hz: 50.0,
        }
    }
}

impl ServoRange {
    /// Build a pulse range. Returns `None` unless the frame rate is positive
    /// and both pulses fit, in order, inside one frame.
    pub fn new(
        min_pulse_us: f32,
        max_pulse_us: f32,
        frequency_hz: f32,
    ) -> Option<Self> {
        if !(frequency_hz > 0.0 && frequency_hz.is_finite()) {
            return None;
        }
        let period_us = 1_000_000.0 / frequency_hz;
        if 0.0 < min_pulse_us && min_pulse_us < max_pulse_us && max_pulse_us < period_us {
            Some(Self {
                min_pulse_us,
                max_pulse_us,
                frequency_hz,
            })
        } else {
            None
        }
    }

    /// Pulse width at full reverse (µs).
    pub fn min_pulse_us(&self) -> f32 {
        self.min_pulse_us
    }

    /// Pulse width at full forward (µs).
    pub fn max_pulse_us(&self) -> f32 {
        self.max_pulse_us
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// PWM frame length (µs).
    pub fn period_us(&self) -> f32 {
        1_000_000.0 / self.frequency_hz
    }
}

/// Unchecked `ServoRange` as it appears in JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct RawServoRange {
    min_pulse_us: f32,
    max_pulse_us: f32,
    frequency_hz: f32,
}

impl Default for RawServoRange {
    fn default() -> Self {
        ServoRange::default().into()
    }
}

impl From<ServoRange> for RawServoRange {
    fn from(r: ServoRange) -> Self {
        RawServoRange {
            min_pulse_us: r.min_pulse_us,
            max_pulse_us: r.max_pulse_us,
            frequency_hz: r.frequency_hz,
        }
    }
}

impl TryFrom<RawServoRange> for ServoRange {
    type Error = &'static str;

    fn try_from(raw: RawServoRange) -> Result<Self, Self::Error> {
        ServoRange::new(raw.min_pulse_us, raw.max_pulse_us, raw.frequency_hz)
            .ok_or("servo range needs frequency_hz > 0 and 0 < min_pulse_us < max_pulse_us < period")
    }
}

fn positive_distance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let cm = f32::deserialize(deserializer)?;
    if cm > 0.0 && cm.is_finite() {
        Ok(cm)
    } else {
        Err(D::Error::custom("max_distance_cm must be positive"))
    }
}

/// Hardware calibration handed to [`crate::Ringbit`] at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub tracking: TrackingThresholds,
    /// Busy-wait iterations to spend waiting for an echo before giving up.
    pub echo_poll_budget: u32,
    /// Readings above this are treated as multipath noise (cm). Must be positive.
    #[serde(deserialize_with = "positive_distance")]
    pub max_distance_cm: f32,
    /// Width of the sonar trigger pulse (µs).
    pub trigger_pulse_us: u32,
    pub servo: ServoRange,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            tracking: TrackingThresholds::default(),
            echo_poll_budget: 5000,
            max_distance_cm: 400.0,
            trigger_pulse_us: 10,
            servo: ServoRange::default(),
        }
    }
}

impl Calibration {
    /// Whether `max_distance_cm` leaves a usable distance window.
    pub fn has_valid_range(&self) -> bool {
        self.max_distance_cm > 0.0 && self.max_distance_cm.is_finite()
    }

    /// Default calibration with a different tracking threshold set.
    pub fn with_tracking(tracking: TrackingThresholds) -> Self {
        Self {
            tracking,
            ..Self::default()
        }
    }
}
