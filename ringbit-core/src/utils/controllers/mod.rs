//! Module Exports
//!
//! - `ringbit`: the Ring:bit driver (wheels, sonar, line tracking).
//! - `servo`: continuous-rotation servo over a PWM channel.
//!
//! `SystemController` binds the driver to the car's fixed sensor ports and
//! executes JSON-friendly `RingbitCommand`s against it.

pub mod ringbit;
pub mod servo;

use embedded_hal::{delay::DelayNs, pwm::SetDutyCycle};
use serde::{Deserialize, Serialize};

use crate::utils::{
    math::{distance::Unit, tracking::Tracking},
    peripherals::{AnalogPin, UltrasonicPin},
};
pub use ringbit::{Error, Ringbit};
pub use servo::ContinuousServo;

/// Command variants understood by `SystemController`.
///
/// Serialized as JSON with tag `"rc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "rc", rename_all = "snake_case")]
pub enum RingbitCommand {
    /// Set wheel speeds in percent (`-100..=100`).
    Speed { l: i32, r: i32 },
    Stop,
    /// Measure distance in the given unit.
    Distance { u: Unit },
    /// Read the line-tracking module.
    Tracking,
}

impl RingbitCommand {
    /// Parse a JSON command such as `{"rc":"speed","l":40,"r":40}`.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// Sensor data produced by a command.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Distance(f32),
    Tracking(Tracking),
}

/// Ring:bit driver plus the sonar and tracking ports it reads from.
pub struct SystemController<L, R, D, U, T> {
    pub driver: Ringbit<L, R, D>,
    ultrasonic: U,
    tracking: T,
}

impl<L, R, D, U, T> SystemController<L, R, D, U, T>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
    D: DelayNs,
    U: UltrasonicPin,
    T: AnalogPin,
{
    pub fn new(
        driver: Ringbit<L, R, D>,
        ultrasonic: U,
        tracking: T,
    ) -> Self {
        SystemController {
            driver,
            ultrasonic,
            tracking,
        }
    }

    /// Execute a `RingbitCommand`.
    ///
    /// Returns sensor data for `Distance` and `Tracking`, `None` otherwise.
    pub fn execute_command(
        &mut self,
        command: RingbitCommand,
    ) -> Result<Option<Reading>, Error> {
        tracing::info!("Executing command: {:?}", command);
        match command {
            RingbitCommand::Speed { l, r } => {
                self.driver.set_speed(l, r)?;
                Ok(None)
            }
            RingbitCommand::Stop => {
                self.driver.stop()?;
                Ok(None)
            }
            RingbitCommand::Distance { u } => {
                let distance = self.driver.get_distance(&mut self.ultrasonic, u)?;
                Ok(Some(Reading::Distance(distance)))
            }
            RingbitCommand::Tracking => {
                let tracking = self.driver.get_tracking(&mut self.tracking)?;
                Ok(Some(Reading::Tracking(tracking)))
            }
        }
    }

    /// Split the controller back into driver and sensor pins.
    pub fn into_parts(self) -> (Ringbit<L, R, D>, U, T) {
        (self.driver, self.ultrasonic, self.tracking)
    }
}
