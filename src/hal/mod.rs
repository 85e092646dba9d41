//! Hardware Abstraction Layer for TinyIrUart.
//!
//! The engine only ever talks to pins through [`PinBank`]. Business logic stays
//! in core modules, HAL is just I/O.

pub mod pins;

#[cfg(target_os = "espidf")]
pub mod esp32;

pub use pins::{HalPins, PlainIr};

/// Every pin operation the tick engine performs.
///
/// Called from tick context: implementations must not block or allocate.
pub trait PinBank {
    /// Enable or disable the IR carrier (modulated output).
    fn ir_carrier(&mut self, on: bool);

    /// Drive the IR pin to a static level (unmodulated output).
    fn ir_drive(&mut self, high: bool);

    /// Release the IR pin: input, no pull, no carrier.
    fn ir_release(&mut self);

    /// Drive the UART transmit line.
    fn tx_write(&mut self, high: bool);

    /// Sample the UART receive line. Idle line reads high.
    fn rx_read(&mut self) -> bool;
}

/// Three-state IR output: carrier, static drive, released.
pub trait IrEmitter {
    fn carrier(&mut self, on: bool);
    fn drive(&mut self, high: bool);
    fn release(&mut self);
}
