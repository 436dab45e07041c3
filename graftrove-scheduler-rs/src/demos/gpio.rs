use crate::demos::Step;
use crate::hardware::DemoHardware;
use crate::screen::Screen;

/// Shows the level of the GP7 input.
#[derive(Default)]
pub struct GpioDemo;

impl GpioDemo {
    pub fn new() -> Self {
        Self
    }

    pub fn step<H: DemoHardware>(&mut self, hw: &mut H) -> Step {
        let status = match hw.read_level() {
            Ok(true) => "Status: HIGH (1)",
            Ok(false) => "Status: LOW (0)",
            Err(_) => "Status: err",
        };
        Step::Frame(Screen::new().text(0, 0, "GP7 Level").text(0, 20, status))
    }
}
