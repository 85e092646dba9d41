//! Module: config
//!
//! Purpose: Init-time configuration for the tick engine.
//!
//! Architecture:
//! - Plain `Copy` struct, built with `const` builders so it can live in a static
//! - Fixed at construction: the engine never rewrites its config
//! - No persistence, runtime state only
//!
//! Safety: Safe. No unsafe blocks.

use crate::error::IuError;

/// Default tick period in nanoseconds (~38.4 kHz tick/carrier rate).
pub const DEFAULT_TICK_PERIOD_NS: u32 = 26_000;

/// Default IR output pin.
pub const DEFAULT_IR_PIN: u8 = 1;

/// Default UART transmit pin.
pub const DEFAULT_TX_PIN: u8 = 3;

/// Default UART receive pin.
pub const DEFAULT_RX_PIN: u8 = 4;

/// Ticks per UART bit.
///
/// Names give the nominal rate at the default 26µs tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BaudDivisor {
    Baud1200 = 32,
    Baud2400 = 16,
    Baud4800 = 8,
    Baud9600 = 4,
}

impl BaudDivisor {
    /// Ticks per bit period.
    #[inline]
    pub const fn ticks_per_bit(self) -> u8 {
        self as u8
    }

    /// Ticks from a start edge to the first sample point, minus one.
    #[inline]
    pub const fn half_bit(self) -> u8 {
        self.ticks_per_bit() / 2 - 1
    }

    /// Actual baud rate at the given tick period.
    pub const fn nominal_baud(self, tick_period_ns: u32) -> u32 {
        let bit_ns = tick_period_ns as u64 * self.ticks_per_bit() as u64;
        if bit_ns == 0 {
            return 0;
        }
        (1_000_000_000u64 / bit_ns) as u32
    }
}

impl TryFrom<u8> for BaudDivisor {
    type Error = IuError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(BaudDivisor::Baud1200),
            16 => Ok(BaudDivisor::Baud2400),
            8 => Ok(BaudDivisor::Baud4800),
            4 => Ok(BaudDivisor::Baud9600),
            other => Err(IuError::InvalidBaudDivisor(other)),
        }
    }
}

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Tick period in nanoseconds. 0 selects [`DEFAULT_TICK_PERIOD_NS`].
    pub tick_period_ns: u32,
    pub baud: BaudDivisor,
    /// Carrier-modulate marks instead of driving a static level.
    pub modulated: bool,
    pub ir_pin: u8,
    /// `None` disables the transmitter.
    pub tx_pin: Option<u8>,
    /// `None` disables the receiver and its edge interrupt.
    pub rx_pin: Option<u8>,
}

impl Config {
    pub const DEFAULT: Self = Self {
        tick_period_ns: DEFAULT_TICK_PERIOD_NS,
        baud: BaudDivisor::Baud2400,
        modulated: true,
        ir_pin: DEFAULT_IR_PIN,
        tx_pin: Some(DEFAULT_TX_PIN),
        rx_pin: Some(DEFAULT_RX_PIN),
    };

    pub const fn with_tick_period_ns(mut self, ns: u32) -> Self {
        self.tick_period_ns = ns;
        self
    }

    pub const fn with_baud(mut self, baud: BaudDivisor) -> Self {
        self.baud = baud;
        self
    }

    pub const fn with_modulation(mut self, modulated: bool) -> Self {
        self.modulated = modulated;
        self
    }

    pub const fn with_ir_pin(mut self, pin: u8) -> Self {
        self.ir_pin = pin;
        self
    }

    pub const fn with_tx_pin(mut self, pin: Option<u8>) -> Self {
        self.tx_pin = pin;
        self
    }

    pub const fn with_rx_pin(mut self, pin: Option<u8>) -> Self {
        self.rx_pin = pin;
        self
    }

    /// Effective tick period, with 0 mapped to the default.
    #[inline]
    pub const fn tick_period_ns(&self) -> u32 {
        if self.tick_period_ns == 0 {
            DEFAULT_TICK_PERIOD_NS
        } else {
            self.tick_period_ns
        }
    }

    /// Carrier frequency. The carrier runs at the tick rate.
    pub const fn carrier_hz(&self) -> u32 {
        1_000_000_000 / self.tick_period_ns()
    }

    /// Actual UART baud rate for this config.
    pub const fn baud_rate(&self) -> u32 {
        self.baud.nominal_baud(self.tick_period_ns())
    }

    /// Reject configurations that assign one pin to two roles.
    pub fn validate(&self) -> Result<(), IuError> {
        let pins = [Some(self.ir_pin), self.tx_pin, self.rx_pin];
        for (i, a) in pins.iter().enumerate() {
            let Some(a) = a else { continue };
            if pins[i + 1..].iter().flatten().any(|b| b == a) {
                return Err(IuError::PinConflict);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.tick_period_ns(), 26_000);
        assert_eq!(cfg.baud.ticks_per_bit(), 16);
        assert!(cfg.modulated);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_tick_period_uses_default() {
        let cfg = Config::DEFAULT.with_tick_period_ns(0);
        assert_eq!(cfg.tick_period_ns(), DEFAULT_TICK_PERIOD_NS);
        assert_eq!(cfg.carrier_hz(), 38_461);
    }

    #[test]
    fn test_baud_divisor_try_from() {
        assert_eq!(BaudDivisor::try_from(8), Ok(BaudDivisor::Baud4800));
        assert_eq!(BaudDivisor::try_from(5), Err(IuError::InvalidBaudDivisor(5)));
    }

    #[test]
    fn test_nominal_baud() {
        assert_eq!(BaudDivisor::Baud2400.nominal_baud(26_000), 2403);
        assert_eq!(BaudDivisor::Baud9600.nominal_baud(26_000), 9615);
        assert_eq!(BaudDivisor::Baud1200.nominal_baud(0), 0);
    }

    #[test]
    fn test_half_bit() {
        assert_eq!(BaudDivisor::Baud1200.half_bit(), 15);
        assert_eq!(BaudDivisor::Baud9600.half_bit(), 1);
    }

    #[test]
    fn test_pin_conflict() {
        let cfg = Config::DEFAULT.with_tx_pin(Some(DEFAULT_RX_PIN));
        assert_eq!(cfg.validate(), Err(IuError::PinConflict));

        let cfg = Config::DEFAULT.with_ir_pin(DEFAULT_TX_PIN);
        assert_eq!(cfg.validate(), Err(IuError::PinConflict));

        let cfg = Config::DEFAULT.with_tx_pin(None).with_rx_pin(None);
        assert!(cfg.validate().is_ok());
    }
}
