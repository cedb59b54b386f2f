//! Output pin driver behavior against the mock register file.

use avr_ddk::OutputPin as _;
use avr_ddk::{DriverError, PinResistor, PinSettings};
use avr_drivers::{OutputPin, Pin, Port};
use avr_platform::mock;

#[test]
fn open_drain_sets_direction_and_accepts_pull_down() {
    let mut pin = OutputPin::new(Pin { port: Port::B, pin: 2 });

    pin.configure(&PinSettings {
        open_drain: true,
        resistor: PinResistor::PullDown,
    })
    .unwrap();

    assert_eq!(mock::port(Port::B).ddr, 0b0000_0100);
}

#[test]
fn unsupported_resistor_mode_is_reported() {
    let mut pin = OutputPin::new(Pin { port: Port::C, pin: 0 });

    let result = pin.configure(&PinSettings {
        open_drain: true,
        resistor: PinResistor::PullUp,
    });
    assert_eq!(result, Err(DriverError::OperationNotSupported));
}

#[test]
fn push_pull_clears_direction_bit() {
    let mut pin = OutputPin::new(Pin { port: Port::D, pin: 5 });

    pin.configure(&PinSettings {
        open_drain: true,
        resistor: PinResistor::PullDown,
    })
    .unwrap();
    assert_eq!(mock::port(Port::D).ddr, 0b0010_0000);

    pin.configure(&PinSettings {
        open_drain: false,
        resistor: PinResistor::PullDown,
    })
    .unwrap();
    assert_eq!(mock::port(Port::D).ddr, 0);
}

#[test]
fn level_round_trips_through_port_and_pin_registers() {
    let mut pin = OutputPin::new(Pin { port: Port::B, pin: 7 });

    pin.set_level(true);
    assert_eq!(mock::port(Port::B).port, 0b1000_0000);

    pin.set_level(false);
    assert_eq!(mock::port(Port::B).port, 0);

    // input side comes from the PIN register
    mock::drive_pin(Port::B, 0b1000_0000, true);
    assert!(pin.level());
    mock::drive_pin(Port::B, 0b1000_0000, false);
    assert!(!pin.level());
}
