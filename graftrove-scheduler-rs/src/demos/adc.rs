use crate::config::DemoConfig;
use crate::demos::Step;
use crate::hardware::DemoHardware;
use crate::screen::Screen;

/// Channels that fit on the screen under the title.
const MAX_CHANNELS: usize = 4;

/// Reads the analog inputs and shows their voltages.
pub struct AdcDemo {
    reference_mv: u32,
    channels: usize,
}

impl AdcDemo {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            reference_mv: config.adc_reference_mv,
            channels: config.adc_channels.min(MAX_CHANNELS),
        }
    }

    pub async fn step<H: DemoHardware>(&mut self, hw: &mut H) -> Step {
        let full_scale = u32::from(hw.analog_full_scale());
        let mut screen = Screen::new().text(0, 0, "ADC0~3 Voltage");

        for i in 0..self.channels {
            let y = 12 + 12 * i as i32;
            match hw.read_analog(i).await {
                Ok(raw) if full_scale > 0 => {
                    let cv = centivolts(u32::from(raw).min(full_scale), full_scale, self.reference_mv);
                    screen.push_line(0, y, format_args!("ADC{}: {}.{:02}V", i, cv / 100, cv % 100));
                }
                _ => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ADC{} read failed", i);
                    screen.push_line(0, y, format_args!("ADC{}: err", i));
                }
            }
        }

        Step::Frame(screen)
    }
}

/// Raw code to hundredths of a volt, rounded to nearest.
fn centivolts(raw: u32, full_scale: u32, reference_mv: u32) -> u32 {
    (raw * reference_mv + full_scale * 5) / (full_scale * 10)
}
