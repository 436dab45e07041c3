//! Compile-time tuning for the scheduler and the demos.

use embassy_time::Duration;

/// Timing of the deferred-work machinery and demo cadences.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Delay between a press's work finishing and the button re-arming.
    pub debounce_window: Duration,
    /// Period of the animation tick source.
    pub animation_period: Duration,
    /// The animation freezes once this much time has passed since it started.
    pub animation_duration: Duration,
    pub adc_cadence: Duration,
    pub pwm_cadence: Duration,
    pub gpio_cadence: Duration,
    pub i2c_cadence: Duration,
    /// Non-blocking poll interval of the UART demo.
    pub uart_poll: Duration,
    /// Poll interval of a faulted demo showing its error screen.
    pub fault_hold: Duration,
    /// How long the boot banner stays up.
    pub banner_hold: Duration,
    /// Blank pause between shutdown and the farewell screen.
    pub shutdown_hold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(100),
            animation_period: Duration::from_millis(50),
            animation_duration: Duration::from_millis(1000),
            adc_cadence: Duration::from_millis(500),
            pwm_cadence: Duration::from_millis(100),
            gpio_cadence: Duration::from_millis(200),
            i2c_cadence: Duration::from_millis(500),
            uart_poll: Duration::from_millis(10),
            fault_hold: Duration::from_millis(500),
            banner_hold: Duration::from_millis(1000),
            shutdown_hold: Duration::from_millis(1000),
        }
    }
}

/// Per-demo parameters.
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    /// ADC reference voltage in millivolts.
    pub adc_reference_mv: u32,
    /// Number of ADC channels read (GP26..).
    pub adc_channels: usize,
    pub pwm_frequency_hz: u32,
    /// Duty sweep bounds and step, in percent.
    pub pwm_duty_min: u8,
    pub pwm_duty_max: u8,
    pub pwm_duty_step: u8,
    pub uart_default_baud: u32,
    pub uart_baud_rates: &'static [u32],
    pub uart_default_timeout_ms: u32,
    pub uart_timeout_min_ms: u32,
    pub uart_timeout_max_ms: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            adc_reference_mv: 3300,
            adc_channels: 4,
            pwm_frequency_hz: 1000,
            pwm_duty_min: 10,
            pwm_duty_max: 90,
            pwm_duty_step: 5,
            uart_default_baud: 9600,
            uart_baud_rates: &[1200, 2400, 4800, 9600, 19200, 38400, 115200],
            uart_default_timeout_ms: 100,
            uart_timeout_min_ms: 10,
            uart_timeout_max_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.debounce_window.as_millis(), 100);
        assert_eq!(c.animation_period.as_millis(), 50);
        assert_eq!(c.animation_duration.as_millis(), 1000);
        assert_eq!(c.uart_poll.as_millis(), 10);
    }

    #[test]
    fn demo_defaults() {
        let c = DemoConfig::default();
        assert_eq!(c.pwm_frequency_hz, 1000);
        assert!(c.uart_baud_rates.contains(&c.uart_default_baud));
        assert!((c.uart_timeout_min_ms..=c.uart_timeout_max_ms).contains(&c.uart_default_timeout_ms));
    }
}
