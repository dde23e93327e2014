//! Utility re-exports for the Ring:bit car.
//!
//! - `calibration`: per-revision sensor and servo parameters
//! - `controllers`: the Ring:bit driver, its servos, and the command dispatcher
//! - `math`: echo-to-distance conversion and tracking classification
//! - `peripherals`: scoped pin acquisition traits for the sensor ports

pub mod calibration;
pub mod controllers;
pub mod math;
pub mod peripherals;

pub use calibration::{Calibration, ServoRange, TrackingThresholds};
pub use controllers::{Reading, RingbitCommand, SystemController};
pub use math::distance::Unit;
pub use math::tracking::Tracking;
