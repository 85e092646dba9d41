//! # TinyIrUart
//!
//! One periodic timer tick multiplexing three timing-critical jobs:
//! IR waveform playback, a bit-banged UART transmitter and a bit-banged
//! UART receiver armed by a start-bit edge interrupt.
//!
//! ## Architecture
//!
//! All pin traffic goes through [`PinBank`], so every state machine is plain
//! logic that runs on the host under test. [`TinyIrUart`] owns the state
//! machines; encoders in [`protocol`] build [`WaveformBuffer`]s for it.
//! - Tick context: [`TinyIrUart::tick`], [`TinyIrUart::on_rx_edge`]
//! - Background: every other method
//! - No locks, no allocation, no blocking

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod engine;
pub mod error;
pub mod fault;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod player;
pub mod protocol;
pub mod ring;
pub mod segment;
pub mod uart;
pub mod waveform;

pub use config::{BaudDivisor, Config};
pub use engine::TinyIrUart;
pub use error::IuError;
pub use fault::{FaultCode, FaultSnapshot, FaultState};
pub use hal::{HalPins, IrEmitter, PinBank, PlainIr};
pub use log_globals::{BG_LOG_STREAM, ISR_LOG_STREAM};
pub use protocol::{encode_nec, encode_rc, RcFrame, RcVariant};
pub use segment::{Level, Segment};
pub use waveform::{WaveformBuffer, WAVEFORM_CAPACITY};
