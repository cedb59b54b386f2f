//! # ATmega Platform Abstraction Layer
//!
//! This crate provides a unified register and interrupt API across two
//! deployment modes:
//! - **Mock Mode**: in-memory register file for fast host-side unit testing
//! - **Hw Mode**: volatile access to the real memory-mapped ATmega registers
//!
//! Register addresses follow the ATmega2560 data-space layout; USART0 sits
//! at the same addresses on the ATmega328P, which simply has fewer ports.
//!
//! ## Usage
//!
//! ```rust
//! use avr_platform::{irq, UsartId};
//! use avr_platform::usart::UsartRegs;
//!
//! let mut regs = UsartRegs::new(UsartId::Usart0);
//! regs.set_baud(103, false);
//! irq::enable();
//! ```
//!
//! ## Build Modes
//!
//! ```bash
//! # Mock (default - host testing)
//! cargo build
//!
//! # Hardware registers
//! cargo build --no-default-features --features hw
//! ```
//!
//! This crate is also the process-wide `critical-section` provider: the
//! acquire/release pair captures and restores the full `SREG` image, so
//! nested sections are safe in both modes.

#![no_std]
#![cfg_attr(all(feature = "hw", target_arch = "avr"), feature(asm_experimental_arch))]

#[cfg(any(test, feature = "mock"))]
extern crate std;

#[cfg(all(feature = "mock", feature = "hw"))]
compile_error!("Select exactly one register backend: either 'mock' or 'hw'.");

#[cfg(not(any(feature = "mock", feature = "hw")))]
compile_error!("No register backend selected. Use either 'mock' or 'hw' feature.");

pub(crate) mod addr;
pub mod gpio;
pub mod irq;
pub mod usart;

#[cfg(feature = "hw")]
pub(crate) mod hw;
#[cfg(feature = "hw")]
pub(crate) use self::hw as backend;

#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "mock")]
pub(crate) use self::mock as backend;

pub use gpio::Port;
pub use usart::UsartId;

/// Platform configuration and detection
pub mod config {
    /// Detect which register backend is active at compile time
    pub fn platform_mode() -> &'static str {
        #[cfg(feature = "mock")]
        return "mock";

        #[cfg(feature = "hw")]
        return "hw";
    }

    /// Check if we're in mock mode (testing)
    pub const fn is_mock() -> bool {
        cfg!(feature = "mock")
    }

    /// Check if we're targeting real hardware
    pub const fn is_hw() -> bool {
        cfg!(feature = "hw")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let mode = config::platform_mode();
        assert!(mode == "mock" || mode == "hw");
    }

    #[test]
    #[cfg(feature = "mock")]
    fn test_mock_mode() {
        assert!(config::is_mock());
        assert!(!config::is_hw());
    }
}
