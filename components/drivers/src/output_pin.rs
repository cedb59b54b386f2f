//! Output pin driver - direct register set/clear, no concurrency concerns

use avr_ddk::{DriverError, PinResistor, PinSettings, Result};
use avr_platform::gpio::PortRegs;
use avr_platform::Port;

/// A pin location: port plus bit position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub port: Port,
    pub pin: u8,
}

/// Driver for one GPIO pin in output duty
pub struct OutputPin {
    regs: PortRegs,
    pin_mask: u8,
}

impl OutputPin {
    pub fn new(pin: Pin) -> Self {
        Self {
            regs: PortRegs::new(pin.port),
            pin_mask: 1 << pin.pin,
        }
    }
}

impl avr_ddk::OutputPin for OutputPin {
    fn configure(&mut self, settings: &PinSettings) -> Result<()> {
        if settings.open_drain {
            self.regs.set_direction_out(self.pin_mask);
            if settings.resistor != PinResistor::PullDown {
                return Err(DriverError::OperationNotSupported);
            }
        } else {
            self.regs.set_direction_in(self.pin_mask);
        }
        Ok(())
    }

    fn set_level(&mut self, high: bool) {
        if high {
            self.regs.set_high(self.pin_mask);
        } else {
            self.regs.set_low(self.pin_mask);
        }
    }

    fn level(&self) -> bool {
        self.regs.is_high(self.pin_mask)
    }
}
