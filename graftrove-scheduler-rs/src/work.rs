//! Plain-data work items and the identifiers they carry.

/// The five hardware demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Demo {
    Adc,
    Pwm,
    Gpio,
    I2cScan,
    Uart,
}

/// Physical push-buttons, one per demo.
///
/// ```text
/// GP11  AIN0  -> Adc
/// GP12  DIO1  -> Pwm
/// GP13  DIO0  -> Gpio
/// GP14  I2C1  -> I2cScan
/// GP15  UART  -> Uart
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Ain0,
    Dio1,
    Dio0,
    I2c1,
    Uart,
}

/// Number of buttons (and debounce slots).
pub const BUTTON_COUNT: usize = 5;

impl Button {
    /// All buttons in slot order.
    pub const ALL: [Button; BUTTON_COUNT] =
        [Button::Ain0, Button::Dio1, Button::Dio0, Button::I2c1, Button::Uart];

    /// Demo started by this button.
    pub const fn demo(self) -> Demo {
        match self {
            Button::Ain0 => Demo::Adc,
            Button::Dio1 => Demo::Pwm,
            Button::Dio0 => Demo::Gpio,
            Button::I2c1 => Demo::I2cScan,
            Button::Uart => Demo::Uart,
        }
    }

    /// Index into per-button tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Which demo currently owns the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveDemo {
    #[default]
    Idle,
    Adc,
    Pwm,
    Gpio,
    I2cScan,
    Uart,
}

impl From<Demo> for ActiveDemo {
    fn from(demo: Demo) -> Self {
        match demo {
            Demo::Adc => ActiveDemo::Adc,
            Demo::Pwm => ActiveDemo::Pwm,
            Demo::Gpio => ActiveDemo::Gpio,
            Demo::I2cScan => ActiveDemo::I2cScan,
            Demo::Uart => ActiveDemo::Uart,
        }
    }
}

impl ActiveDemo {
    pub fn is_idle(self) -> bool {
        self == ActiveDemo::Idle
    }
}

/// A deferred action, pushed from interrupt context and executed by the
/// main loop in push order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Work {
    /// Tear down whatever demo is running.
    StopCurrent,
    /// Bring up a demo and draw its first frame.
    Start(Demo),
    /// Begin the release window of a button's debounce guard.
    EndDebounce(Button),
    /// One animation frame.
    AdvanceAnimation,
    /// Orderly shutdown requested from the terminal.
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_demos() {
        let demos: [Demo; BUTTON_COUNT] = Button::ALL.map(Button::demo);
        assert_eq!(demos, [Demo::Adc, Demo::Pwm, Demo::Gpio, Demo::I2cScan, Demo::Uart]);
    }

    #[test]
    fn button_indices_are_slots() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn active_demo_from_demo() {
        assert_eq!(ActiveDemo::from(Demo::Uart), ActiveDemo::Uart);
        assert!(ActiveDemo::default().is_idle());
        assert!(!ActiveDemo::from(Demo::Adc).is_idle());
    }
}
