//! Math utilities for the Ring:bit car.
//!
//! This module provides the ultrasonic echo conversion and the line-tracking
//! band classification. Everything here is pure arithmetic; the driver feeds it
//! raw peripheral readings.

pub mod distance;
pub mod tracking;
