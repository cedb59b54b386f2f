//! Buffered, interrupt-driven USART driver
//!
//! Foreground half of the driver: the [`Uart`] handle claims a slot in
//! the driver table, owns the hardware configuration, and moves bytes
//! between the caller and the ring buffers under a critical section. The
//! interrupt half lives in [`crate::isr`] and drains/fills the same
//! buffers one hardware event at a time.
//!
//! The transmit path is a two-state machine: `Idle` (data-empty
//! interrupt disarmed, buffer may hold data) and `Draining` (interrupt
//! armed, handler feeds bytes). `flush` moves it to `Draining` when
//! there is anything to send; the handler falls back to `Idle` when the
//! buffer runs dry.

use avr_ddk::{DriverError, Parity, ReadResult, Result, Serial, Settings, StopBits};
use avr_platform::usart::UsartRegs;
use avr_platform::{irq, UsartId};
use bitflags::bitflags;
use critical_section::CriticalSection;

use crate::baud;
use crate::registry::{self, UartState};

bitflags! {
    /// UCSRnB image: enables and interrupt sources
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ControlB: u8 {
        const TX_DATA_BIT8   = 1 << 0;
        const RX_DATA_BIT8   = 1 << 1;
        const SIZE_BIT2      = 1 << 2;
        const TX_ENABLE      = 1 << 3;
        const RX_ENABLE      = 1 << 4;
        const DATA_EMPTY_IE  = 1 << 5;
        const TX_COMPLETE_IE = 1 << 6;
        const RX_COMPLETE_IE = 1 << 7;
    }

    /// UCSRnC image: frame format
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ControlC: u8 {
        const POLARITY    = 1 << 0;
        const SIZE_8BIT   = 0b11 << 1;
        const STOP_TWO    = 1 << 3;
        const PARITY_EVEN = 0b10 << 4;
        const PARITY_ODD  = 0b11 << 4;
    }
}

/// Handle to one USART peripheral
///
/// Exactly one live handle may exist per peripheral index; a second
/// construction fails with [`DriverError::AlreadyClaimed`] and leaves
/// the first untouched. Dropping the handle quiesces the hardware and
/// frees the slot inside a critical section, so a handler can never
/// observe a half-torn-down driver.
pub struct Uart {
    id: UsartId,
    regs: UsartRegs,
}

impl Uart {
    /// Claim a peripheral and install its buffers.
    ///
    /// The caller owns the storage; nothing is allocated. Global
    /// interrupts are enabled on success. The peripheral itself stays
    /// quiet until [`Serial::configure`] is called.
    pub fn new(
        id: UsartId,
        rx_storage: &'static mut [u8],
        tx_storage: &'static mut [u8],
    ) -> Result<Self> {
        let rx_capacity = rx_storage.len();
        let tx_capacity = tx_storage.len();
        let state = UartState::new(rx_storage, tx_storage);

        critical_section::with(|cs| {
            registry::with_table(|table| table.claim(cs, id, state))
        })?;
        irq::enable();

        log::debug!(
            "usart{}: claimed (rx {} B, tx {} B)",
            id.index(),
            rx_capacity,
            tx_capacity
        );
        Ok(Self {
            id,
            regs: UsartRegs::new(id),
        })
    }

    pub fn id(&self) -> UsartId {
        self.id
    }

    /// Whether a received byte has been dropped since the flag was last
    /// cleared
    pub fn overwritten(&self) -> bool {
        critical_section::with(|cs| self.with_state(cs, |state| state.overwritten))
    }

    /// Return and clear the overflow flag
    pub fn take_overwritten(&mut self) -> bool {
        critical_section::with(|cs| {
            self.with_state(cs, |state| core::mem::replace(&mut state.overwritten, false))
        })
    }

    /// Whether the driver has observed an unrecoverable hardware fault
    pub fn bad(&self) -> bool {
        critical_section::with(|cs| self.with_state(cs, |state| state.bad))
    }

    fn with_state<R>(&self, cs: CriticalSection<'_>, f: impl FnOnce(&mut UartState) -> R) -> R {
        registry::with_table(|table| {
            let mut slot = table.slot(self.id).borrow_ref_mut(cs);
            match slot.as_mut() {
                Some(state) => f(state),
                // the slot stays claimed for as long as this handle lives
                None => unreachable!(),
            }
        })
    }
}

impl Serial for Uart {
    /// Apply line settings and enable the peripheral.
    ///
    /// The baud lookup happens before any register write, so an
    /// unsupported rate leaves the hardware untouched. Reconfiguring
    /// while unsent bytes sit in the transmit buffer is rejected; the
    /// caller decides whether to drain or discard first. The data-empty
    /// interrupt is left disarmed - the transmit path starts `Idle`.
    fn configure(&mut self, settings: &Settings) -> Result<()> {
        let entry = baud::select(settings.baud_rate).ok_or(DriverError::UnsupportedBaudRate {
            baud: settings.baud_rate,
        })?;

        let ctrl_b = ControlB::RX_ENABLE | ControlB::TX_ENABLE | ControlB::RX_COMPLETE_IE;

        // 8-bit words: UCSZ2 stays clear, UCSZ1:0 set
        let mut ctrl_c = ControlC::SIZE_8BIT;
        if settings.stop_bits == StopBits::Two {
            ctrl_c |= ControlC::STOP_TWO;
        }
        match settings.parity {
            Parity::None => {}
            Parity::Even => ctrl_c |= ControlC::PARITY_EVEN,
            Parity::Odd => ctrl_c |= ControlC::PARITY_ODD,
        }

        critical_section::with(|cs| {
            let pending = self.with_state(cs, |state| state.tx.len());
            if pending != 0 {
                return Err(DriverError::TxBufferNotEmpty { pending });
            }

            self.regs.set_baud(entry.divisor, entry.double_speed);
            self.regs.write_control(ctrl_b.bits(), ctrl_c.bits());
            Ok(())
        })?;

        log::debug!(
            "usart{}: configured {} baud (divisor {}, u2x {})",
            self.id.index(),
            settings.baud_rate,
            entry.divisor,
            entry.double_speed
        );
        Ok(())
    }

    /// Enqueue as many bytes as fit, then prime transmission.
    ///
    /// Stops silently when the buffer fills; the returned count is the
    /// caller's backpressure signal.
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let written = critical_section::with(|cs| {
            self.with_state(cs, |state| {
                let mut written = 0;
                while written < data.len() && state.tx.push(data[written]).is_ok() {
                    written += 1;
                }
                written
            })
        });

        self.flush()?;
        Ok(written)
    }

    /// Dequeue up to `out.len()` received bytes
    fn read(&mut self, out: &mut [u8]) -> Result<ReadResult> {
        Ok(critical_section::with(|cs| {
            self.with_state(cs, |state| {
                let mut read = 0;
                while read < out.len() {
                    match state.rx.pop() {
                        Some(byte) => {
                            out[read] = byte;
                            read += 1;
                        }
                        None => break,
                    }
                }
                ReadResult {
                    read,
                    available: state.rx.len(),
                    capacity: state.rx.capacity(),
                }
            })
        }))
    }

    /// Prime the asynchronous transmit drain.
    ///
    /// With bytes buffered: arm the data-empty interrupt and bootstrap
    /// the drain by writing one byte straight to the data register. With
    /// an empty buffer there is nothing to drain, so the interrupt is
    /// disarmed instead and the data register is not touched.
    fn flush(&mut self) -> Result<()> {
        critical_section::with(|cs| {
            let next = self.with_state(cs, |state| state.tx.pop());
            match next {
                Some(byte) => {
                    self.regs.set_data_empty_interrupt(true);
                    self.regs.write_data(byte);
                }
                None => self.regs.set_data_empty_interrupt(false),
            }
        });
        Ok(())
    }
}

impl Drop for Uart {
    fn drop(&mut self) {
        critical_section::with(|cs| {
            self.regs.disable();
            registry::with_table(|table| table.release(cs, self.id));
        });
        log::debug!("usart{}: released", self.id.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_images_cover_the_register_layout() {
        // every UCSRnB bit is named, in datasheet order
        assert_eq!(ControlB::all().bits(), 0xFF);
        assert_eq!(ControlB::TX_DATA_BIT8.bits() | ControlB::RX_DATA_BIT8.bits(), 0b11);
        assert_eq!(ControlB::SIZE_BIT2.bits(), 1 << 2);
        assert_eq!(ControlB::DATA_EMPTY_IE.bits(), 1 << 5);
        assert_eq!(ControlB::TX_COMPLETE_IE.bits(), 1 << 6);

        // UCSRnC: UMSEL (bits 7:6) stays zero, asynchronous mode only
        assert_eq!(ControlC::all().bits(), 0b0011_1111);
        assert_eq!(ControlC::POLARITY.bits(), 1);
        assert!(ControlC::PARITY_ODD.contains(ControlC::PARITY_EVEN));
    }
}
