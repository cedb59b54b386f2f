//! Mock register backend for host-side testing.
//!
//! Models the data-space register file in memory, one virtual MCU per
//! test thread, so the standard parallel test harness runs isolated.
//! Beyond the raw register file it keeps the little extra bookkeeping
//! tests need: every write to a UDRn register is logged (the "wire"), and
//! reads of UDRn are counted so tests can assert a handler touched the
//! data register exactly once.

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use crate::addr;
use crate::gpio::Port;
use crate::usart::UsartId;

struct RegisterFile {
    regs: [Cell<u8>; addr::REGISTER_SPACE],
    udr_writes: [RefCell<Vec<u8>>; UsartId::COUNT],
    udr_reads: [Cell<usize>; UsartId::COUNT],
}

impl RegisterFile {
    fn new() -> Self {
        Self {
            regs: core::array::from_fn(|_| Cell::new(0)),
            udr_writes: core::array::from_fn(|_| RefCell::new(Vec::new())),
            udr_reads: core::array::from_fn(|_| Cell::new(0)),
        }
    }

    fn udr_index(addr: usize) -> Option<usize> {
        addr::USART.iter().position(|block| block.udr == addr)
    }
}

std::thread_local! {
    static MCU: RegisterFile = RegisterFile::new();
}

pub(crate) fn read(address: usize) -> u8 {
    MCU.with(|mcu| {
        if let Some(index) = RegisterFile::udr_index(address) {
            mcu.udr_reads[index].set(mcu.udr_reads[index].get() + 1);
        }
        mcu.regs[address].get()
    })
}

pub(crate) fn write(address: usize, value: u8) {
    MCU.with(|mcu| {
        if let Some(index) = RegisterFile::udr_index(address) {
            mcu.udr_writes[index].borrow_mut().push(value);
        }
        mcu.regs[address].set(value);
    })
}

pub(crate) fn sei() {
    MCU.with(|mcu| {
        let sreg = mcu.regs[addr::SREG].get();
        mcu.regs[addr::SREG].set(sreg | addr::SREG_I);
    })
}

/// Raw register peek, for tests that assert on addresses directly
pub fn register(address: usize) -> u8 {
    MCU.with(|mcu| mcu.regs[address].get())
}

/// Snapshot of one USART's configuration registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartSnapshot {
    pub divisor: u16,
    pub double_speed: bool,
    pub ctrl_b: u8,
    pub ctrl_c: u8,
}

impl UsartSnapshot {
    pub fn receiver_enabled(&self) -> bool {
        self.ctrl_b & (1 << 4) != 0
    }

    pub fn transmitter_enabled(&self) -> bool {
        self.ctrl_b & (1 << 3) != 0
    }

    pub fn data_empty_irq_enabled(&self) -> bool {
        self.ctrl_b & addr::UCSRB_UDRIE != 0
    }

    pub fn rx_complete_irq_enabled(&self) -> bool {
        self.ctrl_b & (1 << 7) != 0
    }
}

/// Capture the configuration registers of one USART
pub fn usart(id: UsartId) -> UsartSnapshot {
    let block = id.block();
    MCU.with(|mcu| UsartSnapshot {
        divisor: (mcu.regs[block.ubrrh].get() as u16) << 8 | mcu.regs[block.ubrrl].get() as u16,
        double_speed: mcu.regs[block.ucsra].get() & addr::UCSRA_U2X != 0,
        ctrl_b: mcu.regs[block.ucsrb].get(),
        ctrl_c: mcu.regs[block.ucsrc].get(),
    })
}

/// Latch an incoming byte into the receive data register, as the shift
/// register would on a completed frame
pub fn load_rx(id: UsartId, byte: u8) {
    let udr = id.block().udr;
    MCU.with(|mcu| mcu.regs[udr].set(byte));
}

/// Every byte written to the transmit data register so far, oldest first
pub fn tx_data(id: UsartId) -> Vec<u8> {
    MCU.with(|mcu| mcu.udr_writes[id.index()].borrow().clone())
}

/// How many times the data register has been read
pub fn udr_reads(id: UsartId) -> usize {
    MCU.with(|mcu| mcu.udr_reads[id.index()].get())
}

/// Snapshot of one GPIO port's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSnapshot {
    pub pin: u8,
    pub ddr: u8,
    pub port: u8,
}

/// Capture one GPIO port's registers
pub fn port(port: Port) -> PortSnapshot {
    let block = port.block();
    MCU.with(|mcu| PortSnapshot {
        pin: mcu.regs[block.pin].get(),
        ddr: mcu.regs[block.ddr].get(),
        port: mcu.regs[block.port].get(),
    })
}

/// Drive an external level onto the masked pins of the PIN register
pub fn drive_pin(port: Port, mask: u8, high: bool) {
    let pin = port.block().pin;
    MCU.with(|mcu| {
        let current = mcu.regs[pin].get();
        if high {
            mcu.regs[pin].set(current | mask);
        } else {
            mcu.regs[pin].set(current & !mask);
        }
    })
}
