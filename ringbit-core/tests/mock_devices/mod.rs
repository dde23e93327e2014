//! Fake Ring:bit peripherals shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType as DigitalErrorType, OutputPin},
    pwm::{ErrorType as PwmErrorType, SetDutyCycle},
};
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTrans};
use ringbit_core::utils::peripherals::{AnalogInput, AnalogPin, PulseCapture, UltrasonicPin};

/// Duty resolution used by `RecordingPwm`; equals the 50 Hz frame in µs, so
/// duty values read directly as pulse widths.
pub const MAX_DUTY: u16 = 20_000;

/// PWM channel that records every duty written.
#[derive(Debug, Default)]
pub struct RecordingPwm {
    pub duties: Vec<u16>,
}

impl PwmErrorType for RecordingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        self.duties.push(duty);
        Ok(())
    }
}

/// Error raised by `FlakyPwm` once its write allowance is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmFault;

impl embedded_hal::pwm::Error for PwmFault {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// PWM channel that accepts `writes_left` duty writes and fails every one after.
#[derive(Debug, Default)]
pub struct FlakyPwm {
    pub writes_left: usize,
    pub duties: Vec<u16>,
}

impl FlakyPwm {
    pub fn new(writes_left: usize) -> Self {
        FlakyPwm {
            writes_left,
            duties: Vec::new(),
        }
    }
}

impl PwmErrorType for FlakyPwm {
    type Error = PwmFault;
}

impl SetDutyCycle for FlakyPwm {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        if self.writes_left == 0 {
            return Err(PwmFault);
        }
        self.writes_left -= 1;
        self.duties.push(duty);
        Ok(())
    }
}

/// Delay that records the requested nanoseconds instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        self.total_ns += ns as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    TriggerAcquired,
    TriggerReleased,
    CaptureAcquired,
    Paused,
    Cleared,
    CaptureReleased,
    AnalogAcquired,
    AnalogReleased,
}

/// Expected trigger pin activity for one measurement.
pub fn trigger_pulse() -> Vec<PinTrans> {
    vec![PinTrans::set(State::High), PinTrans::set(State::Low)]
}

/// Sonar pin backed by a digital mock for the trigger and a pulse queue for the echo.
pub struct FakeSonar {
    pub trigger: PinMock,
    pub pulses: VecDeque<u16>,
    /// Polls that report nothing before the queued pulses become visible.
    pub echo_after_polls: usize,
    pub polls: usize,
    pub fail_acquire: bool,
    pub events: Vec<PinEvent>,
}

impl FakeSonar {
    /// A sonar that fires `measurements` triggers and echoes `pulses` at once.
    pub fn new(
        measurements: usize,
        pulses: &[u16],
    ) -> Self {
        let expectations: Vec<PinTrans> = (0..measurements).flat_map(|_| trigger_pulse()).collect();
        FakeSonar {
            trigger: PinMock::new(&expectations),
            pulses: pulses.iter().copied().collect(),
            echo_after_polls: 0,
            polls: 0,
            fail_acquire: false,
            events: Vec::new(),
        }
    }

    /// Queue the echo for the next measurement.
    pub fn echo(
        &mut self,
        width_us: u16,
    ) {
        self.polls = 0;
        self.pulses.push_back(width_us);
    }

    pub fn done(&mut self) {
        self.trigger.done();
    }
}

pub struct FakeTrigger<'a> {
    pin: &'a mut PinMock,
    events: &'a mut Vec<PinEvent>,
}

impl DigitalErrorType for FakeTrigger<'_> {
    type Error = <PinMock as DigitalErrorType>::Error;
}

impl OutputPin for FakeTrigger<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}

impl Drop for FakeTrigger<'_> {
    fn drop(&mut self) {
        self.events.push(PinEvent::TriggerReleased);
    }
}

pub struct FakeCapture<'a> {
    pulses: &'a mut VecDeque<u16>,
    echo_after_polls: usize,
    polls: &'a mut usize,
    events: &'a mut Vec<PinEvent>,
}

impl PulseCapture for FakeCapture<'_> {
    fn captured(&mut self) -> usize {
        *self.polls += 1;
        if *self.polls > self.echo_after_polls {
            self.pulses.len()
        } else {
            0
        }
    }

    fn pause(&mut self) {
        self.events.push(PinEvent::Paused);
    }

    fn pop_front(&mut self) -> Option<u16> {
        self.pulses.pop_front()
    }

    fn clear(&mut self) {
        self.pulses.clear();
        self.events.push(PinEvent::Cleared);
    }
}

impl Drop for FakeCapture<'_> {
    fn drop(&mut self) {
        self.events.push(PinEvent::CaptureReleased);
    }
}

impl UltrasonicPin for FakeSonar {
    type Error = &'static str;
    type Trigger<'a> = FakeTrigger<'a>;
    type Capture<'a> = FakeCapture<'a>;

    fn acquire_trigger(&mut self) -> Result<Self::Trigger<'_>, Self::Error> {
        if self.fail_acquire {
            return Err("pin in use");
        }
        self.events.push(PinEvent::TriggerAcquired);
        Ok(FakeTrigger {
            pin: &mut self.trigger,
            events: &mut self.events,
        })
    }

    fn acquire_capture(&mut self) -> Result<Self::Capture<'_>, Self::Error> {
        self.events.push(PinEvent::CaptureAcquired);
        Ok(FakeCapture {
            pulses: &mut self.pulses,
            echo_after_polls: self.echo_after_polls,
            polls: &mut self.polls,
            events: &mut self.events,
        })
    }
}

/// Tracking port returning a fixed raw sample.
#[derive(Debug, Default)]
pub struct FakeTracking {
    pub raw: u16,
    pub fail_sample: bool,
    pub events: Vec<PinEvent>,
}

impl FakeTracking {
    pub fn new(raw: u16) -> Self {
        FakeTracking {
            raw,
            ..Default::default()
        }
    }
}

pub struct FakeAnalog<'a> {
    raw: u16,
    fail: bool,
    events: &'a mut Vec<PinEvent>,
}

impl AnalogInput for FakeAnalog<'_> {
    type Error = &'static str;

    fn sample(&mut self) -> Result<u16, Self::Error> {
        if self.fail {
            Err("adc busy")
        } else {
            Ok(self.raw)
        }
    }
}

impl Drop for FakeAnalog<'_> {
    fn drop(&mut self) {
        self.events.push(PinEvent::AnalogReleased);
    }
}

impl AnalogPin for FakeTracking {
    type Error = &'static str;
    type Input<'a> = FakeAnalog<'a>;

    fn acquire_analog(&mut self) -> Result<Self::Input<'_>, Self::Error> {
        self.events.push(PinEvent::AnalogAcquired);
        Ok(FakeAnalog {
            raw: self.raw,
            fail: self.fail_sample,
            events: &mut self.events,
        })
    }
}
