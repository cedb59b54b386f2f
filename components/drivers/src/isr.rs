//! Interrupt half of the USART driver
//!
//! One handler per hardware event. Both look their driver up in the
//! driver table and treat an unclaimed slot as a no-op; neither blocks,
//! allocates, or logs. On hardware the handlers already run with global
//! interrupts disabled, so taking the critical section again is a
//! restore-state no-op - it exists to keep a single access discipline
//! for the shared buffers.
//!
//! The test suite calls these functions directly to simulate hardware
//! events against the mock register file.

use avr_platform::usart::UsartRegs;
use avr_platform::UsartId;

use crate::registry;

/// Receive-complete event: one frame is waiting in the data register.
///
/// The data register is read exactly once - the read is what clears the
/// pending condition - whether or not a driver is registered. On a full
/// buffer the oldest byte is evicted and the overflow flag raised, so
/// the buffer always holds the most recent bytes.
pub fn receive_complete(id: UsartId) {
    critical_section::with(|cs| {
        let byte = UsartRegs::new(id).read_data();

        registry::with_table(|table| {
            let mut slot = table.slot(id).borrow_ref_mut(cs);
            let Some(state) = slot.as_mut() else {
                return;
            };

            if state.rx.is_full() {
                state.rx.pop();
                state.overwritten = true;
            }
            let _ = state.rx.push(byte);
        });
    });
}

/// Data-register-empty event: the transmit register can take a byte.
///
/// Feeds the next buffered byte, or disarms its own interrupt once the
/// buffer is empty so it stops firing until `flush` re-arms it.
pub fn data_register_empty(id: UsartId) {
    critical_section::with(|cs| {
        let mut regs = UsartRegs::new(id);

        registry::with_table(|table| {
            let mut slot = table.slot(id).borrow_ref_mut(cs);
            let Some(state) = slot.as_mut() else {
                return;
            };

            match state.tx.pop() {
                Some(byte) => regs.write_data(byte),
                None => regs.set_data_empty_interrupt(false),
            }
        });
    });
}

/// ATmega328P vector table entries (USART_RX / USART_UDRE). Larger parts
/// wire their additional vectors in application code.
#[cfg(all(feature = "hw", target_arch = "avr"))]
mod vectors {
    use super::*;

    #[no_mangle]
    pub unsafe extern "avr-interrupt" fn __vector_18() {
        receive_complete(UsartId::Usart0);
    }

    #[no_mangle]
    pub unsafe extern "avr-interrupt" fn __vector_19() {
        data_register_empty(UsartId::Usart0);
    }
}
