use std::collections::VecDeque;
use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use embedded_hal::{
    digital::{ErrorType as DigitalErrorType, OutputPin},
    pwm::{ErrorType as PwmErrorType, SetDutyCycle},
};
use embedded_hal_mock::eh1::delay::NoopDelay;
use ringbit_core::utils::peripherals::{AnalogInput, AnalogPin, PulseCapture, UltrasonicPin};
use ringbit_core::utils::{Calibration, Reading, RingbitCommand, SystemController, TrackingThresholds};
use ringbit_core::Ringbit;
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// 16-bit tracking samples (9600 / 15040 / 19200)
    SixteenBit,
    /// 12-bit tracking samples (780 / 900 / 1200)
    TwelveBit,
}

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// JSON calibration file; overrides --preset
    #[clap(long)]
    calibration: Option<PathBuf>,
    /// tracking threshold preset
    #[clap(long, value_enum, default_value = "sixteen-bit")]
    preset: Preset,
    /// simulated echo width in microseconds; omit for a sonar that never answers
    #[clap(long)]
    echo_us: Option<u16>,
    /// simulated raw tracking sample
    #[clap(long, default_value_t = 12000)]
    tracking_raw: u16,
}

/// Wheel channel that logs every duty it receives.
struct SimServo {
    side: &'static str,
}

impl PwmErrorType for SimServo {
    type Error = Infallible;
}

impl SetDutyCycle for SimServo {
    fn max_duty_cycle(&self) -> u16 {
        // one count per microsecond of the 20 ms frame
        20_000
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        info!(side = self.side, pulse_us = duty, "servo pulse");
        Ok(())
    }
}

/// Sonar that echoes the same width on every trigger.
struct SimSonar {
    echo_us: Option<u16>,
    pulses: VecDeque<u16>,
}

struct SimTrigger<'a> {
    sonar: &'a mut SimSonar,
}

impl DigitalErrorType for SimTrigger<'_> {
    type Error = Infallible;
}

impl OutputPin for SimTrigger<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if let Some(width) = self.sonar.echo_us {
            self.sonar.pulses.push_back(width);
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        debug!("sonar trigger high");
        Ok(())
    }
}

struct SimCapture<'a> {
    pulses: &'a mut VecDeque<u16>,
}

impl PulseCapture for SimCapture<'_> {
    fn captured(&mut self) -> usize {
        self.pulses.len()
    }

    fn pause(&mut self) {}

    fn pop_front(&mut self) -> Option<u16> {
        self.pulses.pop_front()
    }

    fn clear(&mut self) {
        self.pulses.clear();
    }
}

impl UltrasonicPin for SimSonar {
    type Error = Infallible;
    type Trigger<'a> = SimTrigger<'a>;
    type Capture<'a> = SimCapture<'a>;

    fn acquire_trigger(&mut self) -> Result<Self::Trigger<'_>, Self::Error> {
        Ok(SimTrigger { sonar: self })
    }

    fn acquire_capture(&mut self) -> Result<Self::Capture<'_>, Self::Error> {
        Ok(SimCapture {
            pulses: &mut self.pulses,
        })
    }
}

/// Tracking port returning a fixed sample.
struct SimTracking {
    raw: u16,
}

impl AnalogPin for SimTracking {
    type Error = Infallible;
    type Input<'a> = &'a mut SimTracking;

    fn acquire_analog(&mut self) -> Result<Self::Input<'_>, Self::Error> {
        Ok(self)
    }
}

impl AnalogInput for &mut SimTracking {
    type Error = Infallible;

    fn sample(&mut self) -> Result<u16, Self::Error> {
        Ok(self.raw)
    }
}

#[derive(Serialize)]
struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reading: Option<Reading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_calibration(opts: &Opts) -> Result<Calibration, Box<dyn std::error::Error>> {
    if let Some(path) = &opts.calibration {
        let text = std::fs::read_to_string(path)?;
        let calibration = serde_json::from_str(&text)?;
        info!(path = %path.display(), "loaded calibration");
        return Ok(calibration);
    }
    let tracking = match opts.preset {
        Preset::SixteenBit => TrackingThresholds::SIXTEEN_BIT,
        Preset::TwelveBit => TrackingThresholds::TWELVE_BIT,
    };
    Ok(Calibration::with_tracking(tracking))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts: Opts = Opts::parse();
    let calibration = load_calibration(&opts)?;

    let driver = Ringbit::with_calibration(
        SimServo { side: "left" },
        SimServo { side: "right" },
        NoopDelay::new(),
        calibration,
    )?;
    let sonar = SimSonar {
        echo_us: opts.echo_us,
        pulses: VecDeque::new(),
    };
    let tracking = SimTracking {
        raw: opts.tracking_raw,
    };
    let mut ctrl = SystemController::new(driver, sonar, tracking);

    let active = ctrl.driver.calibration();
    info!(
        thresholds = ?active.tracking.bands(),
        max_cm = active.max_distance_cm,
        echo_us = ?opts.echo_us,
        "Reading JSON commands from stdin"
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match RingbitCommand::from_json(&line) {
            Ok(command) => match ctrl.execute_command(command) {
                Ok(reading) => Response {
                    ok: true,
                    reading,
                    error: None,
                },
                Err(e) => {
                    error!("command failed: {}", e);
                    Response {
                        ok: false,
                        reading: None,
                        error: Some(e.to_string()),
                    }
                }
            },
            Err(e) => {
                error!(?e, "error deserializing RingbitCommand");
                Response {
                    ok: false,
                    reading: None,
                    error: Some("Invalid command format".into()),
                }
            }
        };
        writeln!(out, "{}", serde_json::to_string(&response)?)?;
    }

    ctrl.driver.stop()?;
    Ok(())
}
