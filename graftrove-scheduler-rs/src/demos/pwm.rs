use embedded_hal::pwm::SetDutyCycle;

use crate::config::DemoConfig;
use crate::demos::{push_error, Step};
use crate::error::PeripheralError;
use crate::screen::Screen;

/// Sweeps the duty cycle of the PWM output up and down.
///
/// Each step shows the current duty, applies it, then moves it by the step
/// size; the direction flips once the duty reaches either bound.
pub struct PwmDemo<P> {
    pwm: P,
    frequency_hz: u32,
    duty: i16,
    step: i16,
    min: i16,
    max: i16,
}

impl<P> PwmDemo<P> {
    /// Screen shown when the output could not be opened.
    pub fn init_error(err: &PeripheralError) -> Screen {
        let mut screen = Screen::new().text(0, 0, "PWM Init Error");
        push_error(&mut screen, 0, 20, err);
        screen
    }
}

impl<P: SetDutyCycle> PwmDemo<P> {
    /// Take ownership of an already configured output.
    pub fn new(pwm: P, config: &DemoConfig) -> Self {
        Self {
            pwm,
            frequency_hz: config.pwm_frequency_hz,
            duty: i16::from(config.pwm_duty_min),
            step: i16::from(config.pwm_duty_step),
            min: i16::from(config.pwm_duty_min),
            max: i16::from(config.pwm_duty_max),
        }
    }

    pub fn step(&mut self) -> Step {
        let screen = Screen::new()
            .text(0, 0, "PWM (GP9) Status")
            .line(0, 15, format_args!("Freq: {}Hz", self.frequency_hz))
            .line(0, 30, format_args!("Duty: {}%", self.duty));

        let percent = self.duty.clamp(0, 100) as u8;
        if self.pwm.set_duty_cycle_percent(percent).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("PWM duty {}% rejected", percent);
        }

        self.duty += self.step;
        if self.duty >= self.max || self.duty <= self.min {
            self.step = -self.step;
        }

        Step::Frame(screen)
    }

    /// Duty shown by the next step, in percent.
    pub fn duty(&self) -> i16 {
        self.duty
    }

    /// Hand the output back for release.
    pub fn into_handle(self) -> P {
        self.pwm
    }
}
