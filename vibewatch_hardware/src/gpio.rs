//! GPIO-backed indicator, speaker, alarm output, status LEDs and buttons.
//!
//! Colour channels and the speaker use software PWM on plain output pins.

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, Level, OutputPin, Trigger};

use vibewatch_traits::{Actuators, InputEdge, Rgb, StatusLed};

use crate::error::{HwError, Result};

/// Carrier frequency of the colour channels.
const RGB_PWM_HZ: f64 = 500.0;

/// BCM pin numbers.
#[derive(Debug, Clone)]
pub struct ActuatorPins {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub speaker: u8,
    pub alarm_output: u8,
    pub log_closed_led: u8,
    pub ready_led: u8,
    pub floor_led: u8,
}

pub struct GpioActuators {
    rgb: [OutputPin; 3],
    speaker: OutputPin,
    speaker_period: Option<Duration>,
    alarm_output: OutputPin,
    leds: [OutputPin; 3],
}

fn output(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    gpio.get(pin)
        .map(|p| p.into_output_low())
        .map_err(|e| HwError::Gpio(e.to_string()))
}

impl GpioActuators {
    pub fn new(pins: &ActuatorPins) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            rgb: [
                output(&gpio, pins.red)?,
                output(&gpio, pins.green)?,
                output(&gpio, pins.blue)?,
            ],
            speaker: output(&gpio, pins.speaker)?,
            speaker_period: None,
            alarm_output: output(&gpio, pins.alarm_output)?,
            leds: [
                output(&gpio, pins.log_closed_led)?,
                output(&gpio, pins.ready_led)?,
                output(&gpio, pins.floor_led)?,
            ],
        })
    }

    fn led(&mut self, led: StatusLed) -> &mut OutputPin {
        match led {
            StatusLed::LogClosed => &mut self.leds[0],
            StatusLed::Ready => &mut self.leds[1],
            StatusLed::FloorActive => &mut self.leds[2],
        }
    }
}

impl Actuators for GpioActuators {
    fn set_indicator(&mut self, color: Rgb) {
        for (pin, level) in self.rgb.iter_mut().zip([color.r, color.g, color.b]) {
            let duty = f64::from(level.clamp(0.0, 1.0));
            if let Err(e) = pin.set_pwm_frequency(RGB_PWM_HZ, duty) {
                tracing::warn!(error = %e, "indicator pwm failed");
            }
        }
    }

    fn set_audio_period(&mut self, seconds: f32) {
        if seconds.is_finite() && seconds > 0.0 {
            self.speaker_period = Some(Duration::from_secs_f32(seconds));
        }
    }

    fn set_audio_duty(&mut self, duty: f32) {
        let Some(period) = self.speaker_period else {
            tracing::debug!("speaker duty set before period; ignored");
            return;
        };
        let pulse = period.mul_f32(duty.clamp(0.0, 1.0));
        if let Err(e) = self.speaker.set_pwm(period, pulse) {
            tracing::warn!(error = %e, "speaker pwm failed");
        }
    }

    fn set_digital_output(&mut self, high: bool) {
        self.alarm_output.write(if high { Level::High } else { Level::Low });
    }

    fn set_status_led(&mut self, led: StatusLed, on: bool) {
        self.led(led).write(if on { Level::High } else { Level::Low });
    }
}

/// BCM pins of the three push buttons.
#[derive(Debug, Clone)]
pub struct ButtonPins {
    pub rotate_display: u8,
    pub close_log: u8,
    pub toggle_floor: u8,
}

/// Rising-edge buttons delivered to a callback from the interrupt thread.
/// Interrupts stay armed while this value lives.
pub struct GpioButtons {
    _pins: [InputPin; 3],
}

impl GpioButtons {
    pub fn new<F>(pins: &ButtonPins, sink: F) -> Result<Self>
    where
        F: Fn(InputEdge) + Clone + Send + 'static,
    {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let arm = |pin: u8, edge: InputEdge| -> Result<InputPin> {
            let mut input = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input_pulldown();
            let sink = sink.clone();
            input
                .set_async_interrupt(Trigger::RisingEdge, move |_level| sink(edge))
                .map_err(|e| HwError::Gpio(e.to_string()))?;
            Ok(input)
        };
        Ok(Self {
            _pins: [
                arm(pins.rotate_display, InputEdge::RotateDisplay)?,
                arm(pins.close_log, InputEdge::CloseLog)?,
                arm(pins.toggle_floor, InputEdge::ToggleFloor)?,
            ],
        })
    }
}
