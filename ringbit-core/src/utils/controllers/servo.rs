//! Continuous-rotation servo on a PWM channel.
//!
//! A continuous servo reads the pulse width as speed and direction: the
//! midpoint of its range stops it, the ends spin it full speed either way.

use embedded_hal::pwm::{Error as _, SetDutyCycle};

use crate::{utils::calibration::ServoRange, Error};

/// Throttle-controlled servo over any `SetDutyCycle` channel.
pub struct ContinuousServo<P> {
    pwm: P,
    range: ServoRange,
    throttle: f32,
}

impl<P: SetDutyCycle> ContinuousServo<P> {
    /// Wrap a channel already running at `range.frequency_hz`.
    ///
    /// The channel is left untouched until the first `set_throttle`.
    pub fn new(
        pwm: P,
        range: ServoRange,
    ) -> Self {
        Self {
            pwm,
            range,
            throttle: 0.0,
        }
    }

    /// Last throttle written, in `[-1.0, 1.0]`.
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Drive the servo at `throttle` (`-1.0` full reverse, `1.0` full forward).
    pub fn set_throttle(
        &mut self,
        throttle: f32,
    ) -> Result<(), Error> {
        if !(-1.0..=1.0).contains(&throttle) {
            return Err(Error::ThrottleOutOfRange);
        }

        let duty = self.duty_for(throttle);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|e| Error::Pwm(e.kind()))?;
        self.throttle = throttle;
        tracing::trace!(throttle, duty, "servo throttle set");
        Ok(())
    }

    /// Compute the raw duty for `throttle` against the channel's resolution.
    fn duty_for(
        &self,
        throttle: f32,
    ) -> u16 {
        let max_duty = self.pwm.max_duty_cycle();
        let span = self.range.max_pulse_us() - self.range.min_pulse_us();
        let pulse_us = self.range.min_pulse_us() + span * (throttle + 1.0) / 2.0;
        let duty = libm::roundf(pulse_us / self.range.period_us() * max_duty as f32);
        duty.clamp(0.0, max_duty as f32) as u16
    }

    /// Turn the output fully off (no pulses, servo unpowered).
    pub fn disable(&mut self) -> Result<(), Error> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|e| Error::Pwm(e.kind()))?;
        self.throttle = 0.0;
        Ok(())
    }

    /// Give back the PWM channel.
    pub fn release(self) -> P {
        self.pwm
    }
}
