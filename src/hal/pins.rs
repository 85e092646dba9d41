//! [`PinBank`] built from `embedded-hal` 1.0 digital pins.
//!
//! Lets the engine run on any HAL that implements the `embedded-hal` traits,
//! and on host-side mock pins under test.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{IrEmitter, PinBank};

/// IR emitter over a single push-pull pin, for unmodulated output.
///
/// Without a carrier peripheral, "carrier on" drives the pin high. Release
/// drives it low since a plain output pin cannot float.
pub struct PlainIr<P> {
    pin: P,
}

impl<P: OutputPin> PlainIr<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> IrEmitter for PlainIr<P> {
    #[inline]
    fn carrier(&mut self, on: bool) {
        self.drive(on);
    }

    #[inline]
    fn drive(&mut self, high: bool) {
        let _ = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    #[inline]
    fn release(&mut self) {
        let _ = self.pin.set_low();
    }
}

/// Pin bank over an IR emitter plus optional UART pins.
///
/// A missing TX pin ignores writes. A missing RX pin reads idle-high, so the
/// receiver never sees a start bit.
pub struct HalPins<IR, TX, RX> {
    ir: IR,
    tx: Option<TX>,
    rx: Option<RX>,
}

impl<IR, TX, RX> HalPins<IR, TX, RX>
where
    IR: IrEmitter,
    TX: OutputPin,
    RX: InputPin,
{
    /// Build a pin bank. The TX line is driven idle-high immediately.
    pub fn new(ir: IR, tx: Option<TX>, rx: Option<RX>) -> Self {
        let mut pins = Self { ir, tx, rx };
        pins.tx_write(true);
        pins
    }
}

impl<IR, TX, RX> PinBank for HalPins<IR, TX, RX>
where
    IR: IrEmitter,
    TX: OutputPin,
    RX: InputPin,
{
    #[inline]
    fn ir_carrier(&mut self, on: bool) {
        self.ir.carrier(on);
    }

    #[inline]
    fn ir_drive(&mut self, high: bool) {
        self.ir.drive(high);
    }

    #[inline]
    fn ir_release(&mut self) {
        self.ir.release();
    }

    #[inline]
    fn tx_write(&mut self, high: bool) {
        if let Some(tx) = self.tx.as_mut() {
            let _ = if high { tx.set_high() } else { tx.set_low() };
        }
    }

    #[inline]
    fn rx_read(&mut self) -> bool {
        match self.rx.as_mut() {
            Some(rx) => rx.is_high().unwrap_or(true),
            None => true,
        }
    }
}
