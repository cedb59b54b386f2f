//! Typed accessors for the USART register blocks.
//!
//! `UsartRegs` provides the operations the UART driver and its interrupt
//! handlers need, routed through the selected backend so the same driver
//! logic runs against real registers or the mock register file.

use crate::{addr, backend};

/// Identifies one of the USART peripherals.
///
/// The ATmega2560 has all four; the ATmega328P only has `Usart0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsartId {
    Usart0,
    Usart1,
    Usart2,
    Usart3,
}

impl UsartId {
    /// Number of USART peripherals on the largest supported part
    pub const COUNT: usize = 4;

    pub const ALL: [UsartId; Self::COUNT] = [
        UsartId::Usart0,
        UsartId::Usart1,
        UsartId::Usart2,
        UsartId::Usart3,
    ];

    /// Peripheral index, 0..COUNT
    pub const fn index(self) -> usize {
        match self {
            UsartId::Usart0 => 0,
            UsartId::Usart1 => 1,
            UsartId::Usart2 => 2,
            UsartId::Usart3 => 3,
        }
    }

    pub(crate) const fn block(self) -> addr::UsartBlock {
        addr::USART[self.index()]
    }
}

/// Register accessor for one USART peripheral
pub struct UsartRegs {
    id: UsartId,
}

impl UsartRegs {
    pub const fn new(id: UsartId) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> UsartId {
        self.id
    }

    /// Write the baud divisor and the double-speed (U2X) bit.
    ///
    /// The high byte goes first: on hardware, writing UBRRnL latches the
    /// whole divisor.
    pub fn set_baud(&mut self, divisor: u16, double_speed: bool) {
        let block = self.id.block();
        let ucsra = backend::read(block.ucsra);
        if double_speed {
            backend::write(block.ucsra, ucsra | addr::UCSRA_U2X);
        } else {
            backend::write(block.ucsra, ucsra & !addr::UCSRA_U2X);
        }
        backend::write(block.ubrrh, (divisor >> 8) as u8);
        backend::write(block.ubrrl, (divisor & 0xFF) as u8);
    }

    /// Write both control images; frame format (UCSRnC) before enables
    /// (UCSRnB).
    pub fn write_control(&mut self, ctrl_b: u8, ctrl_c: u8) {
        let block = self.id.block();
        backend::write(block.ucsrc, ctrl_c);
        backend::write(block.ucsrb, ctrl_b);
    }

    /// Clear every enable and interrupt bit, quiescing the peripheral
    pub fn disable(&mut self) {
        backend::write(self.id.block().ucsrb, 0);
    }

    /// Write one byte to the transmit data register
    pub fn write_data(&mut self, byte: u8) {
        backend::write(self.id.block().udr, byte);
    }

    /// Read the receive data register; clears the pending receive condition
    pub fn read_data(&mut self) -> u8 {
        backend::read(self.id.block().udr)
    }

    /// Arm or disarm the data-register-empty interrupt
    pub fn set_data_empty_interrupt(&mut self, enabled: bool) {
        let block = self.id.block();
        let ucsrb = backend::read(block.ucsrb);
        if enabled {
            backend::write(block.ucsrb, ucsrb | addr::UCSRB_UDRIE);
        } else {
            backend::write(block.ucsrb, ucsrb & !addr::UCSRB_UDRIE);
        }
    }

    pub fn data_empty_interrupt_enabled(&self) -> bool {
        backend::read(self.id.block().ucsrb) & addr::UCSRB_UDRIE != 0
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn test_set_baud_writes_divisor_and_u2x() {
        let mut regs = UsartRegs::new(UsartId::Usart0);

        regs.set_baud(103, false);
        let snap = mock::usart(UsartId::Usart0);
        assert_eq!(snap.divisor, 103);
        assert!(!snap.double_speed);

        regs.set_baud(16, true);
        let snap = mock::usart(UsartId::Usart0);
        assert_eq!(snap.divisor, 16);
        assert!(snap.double_speed);
    }

    #[test]
    fn test_data_empty_interrupt_toggle() {
        let mut regs = UsartRegs::new(UsartId::Usart1);
        assert!(!regs.data_empty_interrupt_enabled());

        regs.set_data_empty_interrupt(true);
        assert!(regs.data_empty_interrupt_enabled());

        regs.set_data_empty_interrupt(false);
        assert!(!regs.data_empty_interrupt_enabled());
    }

    #[test]
    fn test_disable_clears_control_b() {
        let mut regs = UsartRegs::new(UsartId::Usart2);
        regs.write_control(0x98, 0x06);
        assert_eq!(mock::usart(UsartId::Usart2).ctrl_b, 0x98);

        regs.disable();
        assert_eq!(mock::usart(UsartId::Usart2).ctrl_b, 0);
    }

    #[test]
    fn test_data_register_round_trip() {
        let mut regs = UsartRegs::new(UsartId::Usart3);
        regs.write_data(0xA5);
        assert_eq!(mock::tx_data(UsartId::Usart3), [0xA5]);

        mock::load_rx(UsartId::Usart3, 0x42);
        assert_eq!(regs.read_data(), 0x42);
        assert_eq!(mock::udr_reads(UsartId::Usart3), 1);
    }
}
