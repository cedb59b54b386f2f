//! Global interrupt control and the `critical-section` provider.
//!
//! The provider captures the whole `SREG` image on acquire, clears the
//! global interrupt flag, and writes the captured image back on release.
//! Restoring the prior image (instead of unconditionally re-enabling)
//! makes nested sections safe: a section entered with interrupts already
//! disabled restores a disabled state.

use crate::{addr, backend};

/// Enable global interrupts (sei)
pub fn enable() {
    backend::sei();
}

/// Whether global interrupts are currently enabled
pub fn enabled() -> bool {
    backend::read(addr::SREG) & addr::SREG_I != 0
}

struct SregCriticalSection;
critical_section::set_impl!(SregCriticalSection);

unsafe impl critical_section::Impl for SregCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let sreg = backend::read(addr::SREG);
        backend::write(addr::SREG, sreg & !addr::SREG_I);
        sreg
    }

    unsafe fn release(restore_state: critical_section::RawRestoreState) {
        backend::write(addr::SREG, restore_state);
    }
}
