//! Infrared remote protocol encoders.
//!
//! Pure functions, no hardware dependencies, never called from the tick ISR.
//! Each encoder fills a [`WaveformBuffer`](crate::waveform::WaveformBuffer)
//! that the player can take as-is. Durations assume the default 26µs tick.
//!
//! - [`nec`]: NEC-style pulse-distance frames (address, command + complements)
//! - [`rc`]: RC5-style (width ≤ 12) and RC6-style (width > 12) Manchester frames

pub mod nec;
pub mod rc;

pub use nec::encode_nec;
pub use rc::{encode_rc, RcFrame, RcVariant};
