//! NEC-style pulse-distance encoder.
//!
//! Frame layout (ticks of 26µs):
//!
//! ```text
//! preamble  M127 M127 M92 S127 S46           ~9ms mark, ~4.5ms space
//! 32 bits   M22 + (S64 = 1 | S22 = 0)         LSB first
//!           address, !address, command, !command
//! trailer   M22 S22 END
//! ```

use crate::segment::Segment;
use crate::waveform::WaveformBuffer;

/// Preamble segments.
pub const PREAMBLE: [Segment; 5] = [
    Segment::mark(127),
    Segment::mark(127),
    Segment::mark(92),
    Segment::space(127),
    Segment::space(46),
];

/// Mark preceding every data bit (~570µs).
pub const BIT_MARK_TICKS: u8 = 22;

/// Space after the mark for a logical 1 (~1.68ms).
pub const ONE_SPACE_TICKS: u8 = 64;

/// Space after the mark for a logical 0 (~570µs).
pub const ZERO_SPACE_TICKS: u8 = 22;

/// Data bits per frame.
pub const DATA_BITS: usize = 32;

/// Segments per frame, sentinel included: 5 + 64 + 2 + 1.
pub const FRAME_SEGMENTS: usize = PREAMBLE.len() + 2 * DATA_BITS + 2 + 1;

/// Encode an NEC frame for `address` / `command`.
pub fn encode_nec(address: u8, command: u8) -> WaveformBuffer {
    let mut buf = WaveformBuffer::new();

    for seg in PREAMBLE {
        buf.put(seg);
    }

    for mut byte in [address, !address, command, !command] {
        for _ in 0..8 {
            buf.put(Segment::mark(BIT_MARK_TICKS));
            if byte & 1 != 0 {
                buf.put(Segment::space(ONE_SPACE_TICKS));
            } else {
                buf.put(Segment::space(ZERO_SPACE_TICKS));
            }
            byte >>= 1;
        }
    }

    buf.put(Segment::mark(BIT_MARK_TICKS));
    buf.put(Segment::space(ZERO_SPACE_TICKS));
    buf
}
