//! Ring:bit car driver.
//!
//! Owns the two wheel servos and borrows the sonar and tracking pins per call.
//! Every operation is a blocking read or write; the only wait is the bounded
//! spin while the sonar echo is captured.

use core::ops::RangeInclusive;

use embedded_hal::{
    delay::DelayNs,
    digital::{self, Error as _, OutputPin},
    pwm::{self, SetDutyCycle},
};

use crate::utils::{
    calibration::Calibration,
    controllers::servo::ContinuousServo,
    math::{
        distance::{echo_to_cm, Unit},
        tracking::{classify, Tracking},
    },
    peripherals::{AnalogInput, AnalogPin, PulseCapture, UltrasonicPin},
};

/// Accepted wheel speed, in percent of full throttle.
pub const SPEED_RANGE: RangeInclusive<i32> = -100..=100;

/// Errors returned by the Ring:bit driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A wheel speed fell outside `-100..=100`.
    SpeedOutOfRange { left: i32, right: i32 },
    /// A raw distance unit code other than `Unit::CM_CODE` or `Unit::INCH_CODE`.
    InvalidUnit(u8),
    /// A servo throttle fell outside `[-1.0, 1.0]`.
    ThrottleOutOfRange,
    /// A wheel PWM channel rejected a duty write.
    Pwm(pwm::ErrorKind),
    /// Driving the sonar trigger line failed.
    Trigger(digital::ErrorKind),
    /// A sensor pin could not be acquired or sampled.
    Sensor,
    /// `Calibration::max_distance_cm` is not a positive distance.
    InvalidCalibration,
}

impl core::fmt::Display for Error {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Error::SpeedOutOfRange { left, right } => {
                write!(f, "speed out of range -100..=100 (left {left}, right {right})")
            }
            Error::InvalidUnit(code) => write!(f, "unknown distance unit code {code}"),
            Error::ThrottleOutOfRange => f.write_str("servo throttle outside [-1.0, 1.0]"),
            Error::Pwm(kind) => write!(f, "pwm channel error: {kind:?}"),
            Error::Trigger(kind) => write!(f, "sonar trigger error: {kind:?}"),
            Error::Sensor => f.write_str("sensor pin unavailable"),
            Error::InvalidCalibration => f.write_str("max_distance_cm must be positive"),
        }
    }
}

impl core::error::Error for Error {}

fn sensor_error<E: core::fmt::Debug>(e: E) -> Error {
    tracing::error!("sensor pin failed: {:?}", e);
    Error::Sensor
}

/// Driver for the Ring:bit car.
///
/// Distance readings that time out or land above
/// [`Calibration::max_distance_cm`] are not reported as errors: the driver
/// returns the last good reading instead. A dead sonar therefore looks like an
/// obstacle frozen in place; check [`Ringbit::last_distance`] over time if that
/// matters.
pub struct Ringbit<L, R, D> {
    left: ContinuousServo<L>,
    right: ContinuousServo<R>,
    delay: D,
    calibration: Calibration,
    last_distance: f32,
}

impl<L, R, D> Ringbit<L, R, D>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
    D: DelayNs,
{
    /// Create a driver with the default calibration.
    ///
    /// `left` and `right` must already run at the servo frame rate (50 Hz).
    pub fn new(
        left: L,
        right: R,
        delay: D,
    ) -> Result<Self, Error> {
        Self::with_calibration(left, right, delay, Calibration::default())
    }

    /// Create a driver for a specific board revision.
    ///
    /// Both wheel channels start fully off. Fails with
    /// `Error::InvalidCalibration` unless `max_distance_cm` is positive.
    pub fn with_calibration(
        left: L,
        right: R,
        delay: D,
        calibration: Calibration,
    ) -> Result<Self, Error> {
        if !calibration.has_valid_range() {
            tracing::error!(max_cm = calibration.max_distance_cm, "rejected calibration");
            return Err(Error::InvalidCalibration);
        }
        let mut left = ContinuousServo::new(left, calibration.servo);
        let mut right = ContinuousServo::new(right, calibration.servo);
        left.disable()?;
        right.disable()?;
        tracing::info!(?calibration, "Ring:bit driver ready");

        Ok(Ringbit {
            left,
            right,
            delay,
            calibration,
            last_distance: 0.0,
        })
    }

    /// Set the wheel speeds as percentages of full throttle.
    ///
    /// Equal positive values drive straight forward; the right servo is
    /// mounted mirrored, so its throttle is negated. Values outside
    /// `-100..=100` are rejected and neither wheel changes.
    ///
    /// If a wheel write fails, both wheels are switched off before the error
    /// is returned, so the car never keeps driving on one side.
    pub fn set_speed(
        &mut self,
        left: i32,
        right: i32,
    ) -> Result<(), Error> {
        if !SPEED_RANGE.contains(&left) || !SPEED_RANGE.contains(&right) {
            tracing::warn!(left, right, "rejected wheel speed");
            return Err(Error::SpeedOutOfRange { left, right });
        }

        let written = self
            .left
            .set_throttle(left as f32 / 100.0)
            .and_then(|()| self.right.set_throttle(-(right as f32 / 100.0)));
        if let Err(e) = written {
            tracing::error!(?e, left, right, "wheel write failed, cutting both wheels");
            self.cut_wheels();
            return Err(e);
        }
        tracing::debug!(left, right, "wheel speed set");
        Ok(())
    }

    /// Switch both outputs fully off, logging any channel that refuses.
    fn cut_wheels(&mut self) {
        if let Err(e) = self.left.disable() {
            tracing::error!(?e, "left wheel did not switch off");
        }
        if let Err(e) = self.right.disable() {
            tracing::error!(?e, "right wheel did not switch off");
        }
    }

    /// Stop both wheels.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.set_speed(0, 0)
    }

    /// Current `(left, right)` servo throttles.
    pub fn throttles(&self) -> (f32, f32) {
        (self.left.throttle(), self.right.throttle())
    }

    /// Measure the distance in front of the sonar on `pin`.
    ///
    /// Fires a trigger pulse, then waits up to
    /// [`Calibration::echo_poll_budget`] polls for the echo. A missing or
    /// out-of-range echo yields the last good reading (initially `0.0`).
    #[tracing::instrument(level = "debug", skip(self, pin))]
    pub fn get_distance<P: UltrasonicPin>(
        &mut self,
        pin: &mut P,
        unit: Unit,
    ) -> Result<f32, Error> {
        self.trigger(pin)?;

        let mut capture = pin.acquire_capture().map_err(sensor_error)?;
        let cm = match self.wait_for_echo(&mut capture) {
            Some(width_us) => self.accept_sample(echo_to_cm(width_us)),
            None => {
                tracing::warn!(
                    polls = self.calibration.echo_poll_budget,
                    fallback = self.last_distance,
                    "no sonar echo"
                );
                self.last_distance
            }
        };
        capture.clear();
        drop(capture);

        Ok(unit.from_cm(cm))
    }

    /// Emit the trigger pulse. The output guard drops before capture starts.
    fn trigger<P: UltrasonicPin>(
        &mut self,
        pin: &mut P,
    ) -> Result<(), Error> {
        let mut trigger = pin.acquire_trigger().map_err(sensor_error)?;
        trigger.set_high().map_err(|e| Error::Trigger(e.kind()))?;
        self.delay.delay_us(self.calibration.trigger_pulse_us);
        trigger.set_low().map_err(|e| Error::Trigger(e.kind()))?;
        Ok(())
    }

    fn wait_for_echo<C: PulseCapture>(
        &self,
        capture: &mut C,
    ) -> Option<u16> {
        let mut polls = 0;
        while capture.captured() == 0 {
            if polls == self.calibration.echo_poll_budget {
                return None;
            }
            polls += 1;
            core::hint::spin_loop();
        }
        capture.pause();
        capture.pop_front()
    }

    /// Keep `cm` as the new fallback if it is in range, else return the fallback.
    fn accept_sample(
        &mut self,
        cm: f32,
    ) -> f32 {
        if cm > self.calibration.max_distance_cm {
            tracing::debug!(cm, fallback = self.last_distance, "sonar echo out of range");
            return self.last_distance;
        }
        self.last_distance = cm;
        cm
    }

    /// Last in-range distance (cm), or `0.0` before the first good echo.
    pub fn last_distance(&self) -> f32 {
        self.last_distance
    }

    /// Read the line-tracking module on `pin`.
    pub fn get_tracking<P: AnalogPin>(
        &self,
        pin: &mut P,
    ) -> Result<Tracking, Error> {
        let raw = {
            let mut input = pin.acquire_analog().map_err(sensor_error)?;
            input.sample().map_err(sensor_error)?
        };
        let tracking = classify(raw, &self.calibration.tracking);
        tracing::debug!(raw, code = tracking.code(), "tracking sampled");
        Ok(tracking)
    }

    /// Calibration the driver was built with.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Tear down the driver and return the wheel channels and delay.
    pub fn release(self) -> (L, R, D) {
        (self.left.release(), self.right.release(), self.delay)
    }
}
