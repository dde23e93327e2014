//! Line-tracking classification.
//!
//! The Ring:bit tracking module puts two IR reflectance sensors behind a single
//! analog output, so one sample encodes which side sits over the (dark) line.
//! Darker surfaces return lower readings.

use serde::{Deserialize, Serialize};

use crate::utils::calibration::TrackingThresholds;

/// Line position reported by the tracking module.
///
/// Serialized as its two-digit code (`11`, `10`, `1`, `0`): one digit per
/// sensor, left then right, `1` meaning that sensor sees the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tracking {
    /// Both sensors over the line (darkest band).
    BothOnLine,
    LeftOnLine,
    RightOnLine,
    /// Neither sensor over the line (lightest band).
    OffLine,
}

impl Tracking {
    pub fn code(self) -> u8 {
        match self {
            Tracking::BothOnLine => 11,
            Tracking::LeftOnLine => 10,
            Tracking::RightOnLine => 1,
            Tracking::OffLine => 0,
        }
    }
}

impl From<Tracking> for u8 {
    fn from(t: Tracking) -> Self {
        t.code()
    }
}

impl TryFrom<u8> for Tracking {
    type Error = &'static str;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            11 => Ok(Tracking::BothOnLine),
            10 => Ok(Tracking::LeftOnLine),
            1 => Ok(Tracking::RightOnLine),
            0 => Ok(Tracking::OffLine),
            _ => Err("tracking code must be one of 11, 10, 1, 0"),
        }
    }
}

/// Map a raw analog sample onto a tracking band.
///
/// Each band includes its lower threshold. The top band is open-ended, so a
/// saturated ADC still classifies as `OffLine`.
pub fn classify(
    raw: u16,
    thresholds: &TrackingThresholds,
) -> Tracking {
    let [dark, mid, light] = thresholds.bands();
    if raw < dark {
        Tracking::BothOnLine
    } else if raw < mid {
        Tracking::LeftOnLine
    } else if raw < light {
        Tracking::RightOnLine
    } else {
        Tracking::OffLine
    }
}
