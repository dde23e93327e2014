//! Scoped pin acquisition for the Ring:bit sensor ports.
//!
//! The sonar shares one pin between trigger and echo, and the tracking port is
//! only sampled on demand, so the driver borrows these pins per call instead of
//! owning them. Acquiring a pin returns a guard that borrows it mutably; the
//! board layer reconfigures or deinitializes the pin when the guard drops.
//! That makes release happen on every exit path, early returns included.
//!
//! Motor outputs and the trigger line use `embedded-hal` traits directly.
//! `embedded-hal` 1.0 has no pulse-capture or ADC traits, so those are defined
//! here.

use embedded_hal::digital::OutputPin;

/// Buffered pulse-duration capture (a `PulseIn`-style peripheral).
pub trait PulseCapture {
    /// Number of pulse widths captured so far.
    fn captured(&mut self) -> usize;

    /// Stop recording new pulses.
    fn pause(&mut self);

    /// Remove and return the oldest captured width, in microseconds.
    fn pop_front(&mut self) -> Option<u16>;

    /// Drop every buffered width.
    fn clear(&mut self);
}

/// One-shot analog input.
pub trait AnalogInput {
    type Error: core::fmt::Debug;

    fn sample(&mut self) -> Result<u16, Self::Error>;
}

/// A pin that can act as a sonar trigger output or as its echo capture.
pub trait UltrasonicPin {
    /// Failure to reconfigure the pin.
    type Error: core::fmt::Debug;
    type Trigger<'a>: OutputPin
    where
        Self: 'a;
    type Capture<'a>: PulseCapture
    where
        Self: 'a;

    /// Configure the pin as a push-pull output.
    fn acquire_trigger(&mut self) -> Result<Self::Trigger<'_>, Self::Error>;

    /// Configure the pin as a pulse-duration capture input.
    fn acquire_capture(&mut self) -> Result<Self::Capture<'_>, Self::Error>;
}

/// A pin that can be sampled through the ADC.
pub trait AnalogPin {
    type Error: core::fmt::Debug;
    type Input<'a>: AnalogInput<Error = Self::Error>
    where
        Self: 'a;

    fn acquire_analog(&mut self) -> Result<Self::Input<'_>, Self::Error>;
}
