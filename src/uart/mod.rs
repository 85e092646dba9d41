//! Bit-banged UART on the shared tick.
//!
//! Frame format is fixed at 8N1 with one bit per `divisor` ticks:
//!
//! ```text
//! position   0      1 .. 8          9      10
//!          start   data LSB first   stop   stop (byte retired)
//! ```

pub mod rx;
pub mod tx;

pub use rx::{RxTick, UartRx};
pub use tx::{TxTick, UartTx, TX_SLOT_SIZE};

/// Start bit position.
pub(crate) const START_BIT: u8 = 0;

/// Last data bit position.
pub(crate) const LAST_DATA_BIT: u8 = 8;

/// Position at which a frame is complete.
pub(crate) const FRAME_END: u8 = 10;
