//! RC5/RC6-style Manchester encoder.
//!
//! One function covers both protocols. `width` is the total number of field
//! bits to send and also picks the variant: up to 12 is RC5-style, anything
//! wider is RC6-style.
//!
//! ```text
//! RC5 (half = 34 ticks)
//!   header  M S | cmd bit 6 | toggle          6 segments
//!   fields  address:5 command:6 ext1:8 ext2:8 MSB first
//!
//! RC6 (half = 17 ticks)
//!   header  M102 S34 M17 S17 (S M)x3 | toggle (double width)   12 segments
//!   fields  address:8 command:8 ext1:8 ext2:8 MSB first, inverted
//!
//! both      bit 1 = S M, bit 0 = M S, trailer S END
//! ```

use crate::segment::Segment;
use crate::waveform::WaveformBuffer;

/// Widest frame that still uses the RC5 layout.
pub const RC5_MAX_WIDTH: u8 = 12;

/// Conventional RC5 width (5 address + 6 command bits).
pub const RC5_WIDTH: u8 = 11;

/// RC5 half-bit period (~900µs).
pub const RC5_HALF_TICKS: u8 = 34;

/// RC6 half-bit period (~450µs).
pub const RC6_HALF_TICKS: u8 = 17;

/// Header segments for the RC5 layout.
pub const RC5_HEADER_SEGMENTS: usize = 6;

/// Header segments for the RC6 layout.
pub const RC6_HEADER_SEGMENTS: usize = 12;

/// Trailing space plus sentinel.
pub const TRAILER_SEGMENTS: usize = 2;

/// Field bits available in the RC5 layout.
pub const RC5_FIELD_BITS: u8 = 5 + 6 + 8 + 8;

/// Field bits available in the RC6 layout.
pub const RC6_FIELD_BITS: u8 = 4 * 8;

/// Longest possible frame, sentinel included.
pub const MAX_FRAME_SEGMENTS: usize =
    RC6_HEADER_SEGMENTS + 2 * RC6_FIELD_BITS as usize + TRAILER_SEGMENTS;

/// Frame layout selected by `width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RcVariant {
    /// Five-field layout, `width <= 12`.
    Rc5,
    /// Six-field layout with leader and toggle field, `width > 12`.
    Rc6,
}

impl RcVariant {
    /// Variant implied by a requested bit count.
    #[inline]
    pub const fn for_width(width: u8) -> Self {
        if width > RC5_MAX_WIDTH {
            RcVariant::Rc6
        } else {
            RcVariant::Rc5
        }
    }

    /// Half-bit period in ticks.
    #[inline]
    pub const fn half_ticks(self) -> u8 {
        match self {
            RcVariant::Rc5 => RC5_HALF_TICKS,
            RcVariant::Rc6 => RC6_HALF_TICKS,
        }
    }

    /// Segments before the first field bit.
    #[inline]
    pub const fn header_segments(self) -> usize {
        match self {
            RcVariant::Rc5 => RC5_HEADER_SEGMENTS,
            RcVariant::Rc6 => RC6_HEADER_SEGMENTS,
        }
    }

    /// Field bits this layout can carry.
    #[inline]
    pub const fn field_bits(self) -> u8 {
        match self {
            RcVariant::Rc5 => RC5_FIELD_BITS,
            RcVariant::Rc6 => RC6_FIELD_BITS,
        }
    }
}

/// One RC5/RC6 frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RcFrame {
    /// Total field bits to emit. Also selects the variant.
    pub width: u8,
    /// Toggle bit, flipped by the caller on every new key press.
    pub toggle: bool,
    pub address: u8,
    pub command: u8,
    pub ext1: u8,
    pub ext2: u8,
}

impl RcFrame {
    /// Conventional RC5 frame (11 field bits).
    pub const fn rc5(address: u8, command: u8, toggle: bool) -> Self {
        Self {
            width: RC5_WIDTH,
            toggle,
            address,
            command,
            ext1: 0,
            ext2: 0,
        }
    }

    /// RC6-style frame with `width` field bits (clamped into 13..=32).
    pub const fn rc6(width: u8, address: u8, command: u8, toggle: bool) -> Self {
        let width = if width <= RC5_MAX_WIDTH {
            RC5_MAX_WIDTH + 1
        } else if width > RC6_FIELD_BITS {
            RC6_FIELD_BITS
        } else {
            width
        };
        Self {
            width,
            toggle,
            address,
            command,
            ext1: 0,
            ext2: 0,
        }
    }

    /// Set the two extension fields.
    pub const fn with_ext(mut self, ext1: u8, ext2: u8) -> Self {
        self.ext1 = ext1;
        self.ext2 = ext2;
        self
    }

    /// Layout implied by `width`.
    #[inline]
    pub const fn variant(&self) -> RcVariant {
        RcVariant::for_width(self.width)
    }

    /// Field bits that will actually be emitted.
    #[inline]
    pub fn emitted_bits(&self) -> u8 {
        self.width.min(self.variant().field_bits())
    }

    /// Segments [`encode_rc`] will produce, sentinel included.
    pub fn frame_segments(&self) -> usize {
        self.variant().header_segments() + 2 * self.emitted_bits() as usize + TRAILER_SEGMENTS
    }

    /// Fields as (MSB-aligned value, bit count), in transmit order.
    fn fields(&self) -> [(u8, u8); 4] {
        match self.variant() {
            RcVariant::Rc5 => [
                (self.address << 3, 5),
                (self.command << 2, 6),
                (self.ext1, 8),
                (self.ext2, 8),
            ],
            RcVariant::Rc6 => [
                (!self.address, 8),
                (!self.command, 8),
                (!self.ext1, 8),
                (!self.ext2, 8),
            ],
        }
    }
}

/// Encode an RC5/RC6-style frame.
pub fn encode_rc(frame: &RcFrame) -> WaveformBuffer {
    let variant = frame.variant();
    let half = variant.half_ticks();
    let mut buf = WaveformBuffer::new();

    match variant {
        RcVariant::Rc6 => {
            // Leader and start bit
            buf.put(Segment::mark(half * 6));
            buf.put(Segment::space(half * 2));
            buf.put(Segment::mark(half));
            buf.put(Segment::space(half));
            // Mode field
            for _ in 0..3 {
                buf.put(Segment::space(half));
                buf.put(Segment::mark(half));
            }
            // Toggle field is twice as wide
            let wide = half * 2;
            if frame.toggle {
                buf.put(Segment::mark(wide));
                buf.put(Segment::space(wide));
            } else {
                buf.put(Segment::space(wide));
                buf.put(Segment::mark(wide));
            }
        }
        RcVariant::Rc5 => {
            buf.put(Segment::mark(half));
            buf.put(Segment::space(half));
            // Second start bit carries command bit 6
            put_manchester(&mut buf, frame.command & 0x40 != 0, half);
            put_manchester(&mut buf, frame.toggle, half);
        }
    }

    let mut emitted = 0u8;
    'fields: for (mut value, bits) in frame.fields() {
        if emitted >= frame.width {
            break;
        }
        for _ in 0..bits {
            put_manchester(&mut buf, value & 0x80 != 0, half);
            value <<= 1;
            emitted += 1;
            if emitted == frame.width {
                break 'fields;
            }
        }
    }

    buf.put(Segment::space(half));
    buf
}

#[inline]
fn put_manchester(buf: &mut WaveformBuffer, bit: bool, half: u8) {
    if bit {
        buf.put(Segment::space(half));
        buf.put(Segment::mark(half));
    } else {
        buf.put(Segment::mark(half));
        buf.put(Segment::space(half));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_selection() {
        assert_eq!(RcVariant::for_width(11), RcVariant::Rc5);
        assert_eq!(RcVariant::for_width(12), RcVariant::Rc5);
        assert_eq!(RcVariant::for_width(13), RcVariant::Rc6);
    }

    #[test]
    fn test_max_frame_fits() {
        assert_eq!(MAX_FRAME_SEGMENTS, 78);
        let frame = RcFrame::rc6(32, 0xFF, 0xFF, true).with_ext(0xFF, 0xFF);
        assert_eq!(encode_rc(&frame).as_terminated().len(), MAX_FRAME_SEGMENTS);
    }

    #[test]
    fn test_rc6_clamps_width() {
        assert_eq!(RcFrame::rc6(4, 0, 0, false).width, 13);
        assert_eq!(RcFrame::rc6(200, 0, 0, false).width, 32);
    }

    #[test]
    fn test_rc5_header_raw_bytes() {
        // command bit 6 set, toggle clear
        let buf = encode_rc(&RcFrame::rc5(0, 0x40, false));
        let raw: [u8; 6] = core::array::from_fn(|i| buf.segments()[i].bits());
        assert_eq!(raw, [0xA2, 0x22, 0x22, 0xA2, 0xA2, 0x22]);
    }

    #[test]
    fn test_rc6_header_raw_bytes() {
        let buf = encode_rc(&RcFrame::rc6(16, 0, 0, true));
        let raw: [u8; 12] = core::array::from_fn(|i| buf.segments()[i].bits());
        assert_eq!(
            raw,
            [0xE6, 0x22, 0x91, 0x11, 0x11, 0x91, 0x11, 0x91, 0x11, 0x91, 0xA2, 0x22]
        );
    }

    #[test]
    fn test_zero_width_emits_header_and_trailer() {
        let frame = RcFrame {
            width: 0,
            toggle: false,
            address: 0x1F,
            command: 0x3F,
            ext1: 0,
            ext2: 0,
        };
        let buf = encode_rc(&frame);
        assert_eq!(buf.as_terminated().len(), RC5_HEADER_SEGMENTS + TRAILER_SEGMENTS);
        assert_eq!(frame.frame_segments(), RC5_HEADER_SEGMENTS + TRAILER_SEGMENTS);
    }
}
