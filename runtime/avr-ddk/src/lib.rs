//! AVR DDK - Runtime support for device driver development
//!
//! This crate provides the types and traits shared by the ATmega drivers
//! and their consumers: error types, the serial-port contract, and the
//! output-pin contract. Error variants carry plain data only, so the
//! crate stays allocation-free.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

use thiserror::Error;

/// Driver error types
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("peripheral index {index} already has a live driver")]
    AlreadyClaimed { index: usize },

    #[error("operation not supported by this hardware variant")]
    OperationNotSupported,

    #[error("no baud table entry for {baud} baud")]
    UnsupportedBaudRate { baud: u32 },

    #[error("transmit buffer still holds {pending} unsent bytes")]
    TxBufferNotEmpty { pending: usize },
}

pub type Result<T> = core::result::Result<T, DriverError>;

/// Number of stop bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Serial line settings; the word size is fixed at 8 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub baud_rate: u32,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl Settings {
    /// 8N1 framing at the given baud rate
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

/// Outcome of a non-blocking read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResult {
    /// Bytes copied into the caller's buffer
    pub read: usize,
    /// Bytes still buffered after this read
    pub available: usize,
    /// Total receive buffer capacity, for overflow-margin bookkeeping
    pub capacity: usize,
}

/// Abstract serial port
///
/// All operations are non-blocking and best-effort; a short write or read
/// is backpressure, not an error. Retry and backoff belong to the caller.
pub trait Serial {
    fn configure(&mut self, settings: &Settings) -> Result<()>;

    /// Enqueue as many bytes as fit; returns the number consumed
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Dequeue up to `out.len()` buffered bytes
    fn read(&mut self, out: &mut [u8]) -> Result<ReadResult>;

    /// Prime asynchronous transmission of buffered bytes
    fn flush(&mut self) -> Result<()>;
}

/// Pin resistor modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinResistor {
    None,
    PullUp,
    PullDown,
}

/// Output pin settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSettings {
    pub open_drain: bool,
    pub resistor: PinResistor,
}

/// Abstract output pin
pub trait OutputPin {
    fn configure(&mut self, settings: &PinSettings) -> Result<()>;

    fn set_level(&mut self, high: bool);

    fn level(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_settings_default_framing() {
        let settings = Settings::new(9600);
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.parity, Parity::None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DriverError::AlreadyClaimed { index: 0 }.to_string(),
            "peripheral index 0 already has a live driver"
        );
        assert_eq!(
            DriverError::UnsupportedBaudRate { baud: 31250 }.to_string(),
            "no baud table entry for 31250 baud"
        );
        assert_eq!(
            DriverError::TxBufferNotEmpty { pending: 2 }.to_string(),
            "transmit buffer still holds 2 unsent bytes"
        );
    }
}
