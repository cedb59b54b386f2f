//! Driver table - routes hardware events to the live driver instance
//!
//! A bounded table with one slot per USART peripheral. A slot holds the
//! driver's shared state (the two ring buffers and the status flags)
//! exactly while a [`Uart`](crate::Uart) handle for that index is alive:
//! construction claims the slot, `Drop` releases it. Interrupt handlers
//! look their slot up here and treat an unclaimed slot as a no-op, so an
//! event arriving with no driver registered can never dereference stale
//! state.
//!
//! All access goes through `critical_section::Mutex`, in the foreground
//! as in the handlers. On hardware the table is a process-wide static;
//! the mock backend keeps one table per test thread to match the
//! per-thread register file.

use core::cell::RefCell;

use avr_ddk::DriverError;
use avr_platform::UsartId;
use critical_section::{CriticalSection, Mutex};

use crate::ring_buffer::RingBuffer;

/// Shared state of one live UART driver
pub(crate) struct UartState {
    pub rx: RingBuffer<'static, u8>,
    pub tx: RingBuffer<'static, u8>,
    /// An rx byte was dropped to make room for a newer one
    pub overwritten: bool,
    /// Reserved for unrecoverable hardware fault reporting
    pub bad: bool,
}

impl UartState {
    pub(crate) fn new(rx_storage: &'static mut [u8], tx_storage: &'static mut [u8]) -> Self {
        Self {
            rx: RingBuffer::new(rx_storage),
            tx: RingBuffer::new(tx_storage),
            overwritten: false,
            bad: false,
        }
    }
}

type Slot = Mutex<RefCell<Option<UartState>>>;

pub(crate) struct DriverTable {
    uarts: [Slot; UsartId::COUNT],
}

impl DriverTable {
    const fn new() -> Self {
        const EMPTY: Slot = Mutex::new(RefCell::new(None));
        Self {
            uarts: [EMPTY; UsartId::COUNT],
        }
    }

    /// Install driver state for an index; fails if the slot is occupied
    pub(crate) fn claim(
        &self,
        cs: CriticalSection<'_>,
        id: UsartId,
        state: UartState,
    ) -> Result<(), DriverError> {
        let mut slot = self.uarts[id.index()].borrow_ref_mut(cs);
        if slot.is_some() {
            return Err(DriverError::AlreadyClaimed { index: id.index() });
        }
        *slot = Some(state);
        Ok(())
    }

    /// Clear an index's slot, returning the state that was installed
    pub(crate) fn release(&self, cs: CriticalSection<'_>, id: UsartId) -> Option<UartState> {
        self.uarts[id.index()].borrow_ref_mut(cs).take()
    }

    pub(crate) fn slot(&self, id: UsartId) -> &Slot {
        &self.uarts[id.index()]
    }
}

#[cfg(feature = "hw")]
static DRIVERS: DriverTable = DriverTable::new();

#[cfg(feature = "hw")]
pub(crate) fn with_table<R>(f: impl FnOnce(&DriverTable) -> R) -> R {
    f(&DRIVERS)
}

// One virtual MCU per test thread, matching the mock register file
#[cfg(feature = "mock")]
std::thread_local! {
    static DRIVERS: DriverTable = DriverTable::new();
}

#[cfg(feature = "mock")]
pub(crate) fn with_table<R>(f: impl FnOnce(&DriverTable) -> R) -> R {
    DRIVERS.with(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(len: usize) -> &'static mut [u8] {
        std::boxed::Box::leak(std::vec![0u8; len].into_boxed_slice())
    }

    fn state() -> UartState {
        UartState::new(storage(4), storage(4))
    }

    #[test]
    fn test_claim_and_release() {
        critical_section::with(|cs| {
            with_table(|table| {
                assert!(table.claim(cs, UsartId::Usart0, state()).is_ok());
                assert!(table.release(cs, UsartId::Usart0).is_some());
                // releasing an empty slot is harmless
                assert!(table.release(cs, UsartId::Usart0).is_none());
            })
        });
    }

    #[test]
    fn test_double_claim_rejected() {
        critical_section::with(|cs| {
            with_table(|table| {
                table.claim(cs, UsartId::Usart1, state()).unwrap();
                assert_eq!(
                    table.claim(cs, UsartId::Usart1, state()),
                    Err(DriverError::AlreadyClaimed { index: 1 })
                );
            })
        });
    }

    #[test]
    fn test_slots_are_independent() {
        critical_section::with(|cs| {
            with_table(|table| {
                table.claim(cs, UsartId::Usart2, state()).unwrap();
                assert!(table.slot(UsartId::Usart3).borrow_ref(cs).is_none());
                assert!(table.slot(UsartId::Usart2).borrow_ref(cs).is_some());
            })
        });
    }
}
