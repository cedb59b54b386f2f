//! ATmega peripheral drivers
//!
//! # Purpose
//! Buffered, interrupt-driven UART driver plus a direct-register output
//! pin driver, with no dynamic allocation anywhere: ring buffer storage
//! is caller-owned and the driver table is a bounded static.
//!
//! # Architecture
//! Foreground code talks to a [`Uart`] handle implementing the
//! [`avr_ddk::Serial`] contract; hardware events enter through the
//! [`isr`] handlers and meet the foreground in the ring buffers, with
//! every shared access serialized by the `critical-section` provider in
//! `avr-platform`.
//!
//! # Testing Strategy
//! - Unit tests: ring buffer invariants, baud table, driver table
//! - Integration tests: full driver against the mock register file,
//!   with the handlers invoked directly to simulate hardware events
//! - Hardware: build with `--no-default-features --features hw`

#![no_std]
#![cfg_attr(all(feature = "hw", target_arch = "avr"), feature(abi_avr_interrupt))]

#[cfg(any(test, feature = "mock"))]
extern crate std;

mod baud;
pub mod isr;
mod output_pin;
mod registry;
mod ring_buffer;
mod uart;

pub use output_pin::{OutputPin, Pin};
pub use ring_buffer::RingBuffer;
pub use uart::Uart;

// The peripheral identifiers callers need alongside the drivers
pub use avr_platform::{Port, UsartId};
