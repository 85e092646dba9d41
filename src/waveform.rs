//! Module: waveform
//!
//! Purpose: Fixed-capacity Waveform Buffer. Encoders build one, the player
//! copies it into its own slot and plays it.
//!
//! Architecture:
//! - Static capacity, no allocation
//! - Always sentinel-terminated: the player can never read past the end
//! - Capacity is checked against every encoder's worst case at compile time
//!
//! Safety: Safe. No unsafe blocks.

use crate::error::IuError;
use crate::protocol::{nec, rc};
use crate::segment::Segment;

/// Segments a buffer can hold, sentinel included.
pub const WAVEFORM_CAPACITY: usize = 80;

// Every encoder must fit, sentinel included.
const _: () = assert!(nec::FRAME_SEGMENTS <= WAVEFORM_CAPACITY);
const _: () = assert!(rc::MAX_FRAME_SEGMENTS <= WAVEFORM_CAPACITY);

/// An ordered run of segments terminated by [`Segment::END`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformBuffer {
    segments: [Segment; WAVEFORM_CAPACITY],
    /// Segments before the sentinel.
    len: usize,
}

impl WaveformBuffer {
    /// Create an empty waveform (sentinel only).
    pub const fn new() -> Self {
        Self {
            segments: [Segment::END; WAVEFORM_CAPACITY],
            len: 0,
        }
    }

    /// Build a waveform from caller-provided segments.
    ///
    /// Stops at the first sentinel in `segments`. Without one, the sentinel is
    /// appended. Returns `WaveformTooLong` if the segments plus sentinel do not fit.
    pub fn from_segments(segments: &[Segment]) -> Result<Self, IuError> {
        let body = segments
            .iter()
            .position(|s| s.is_end())
            .unwrap_or(segments.len());

        if body >= WAVEFORM_CAPACITY {
            return Err(IuError::WaveformTooLong { len: body });
        }

        let mut buf = Self::new();
        buf.segments[..body].copy_from_slice(&segments[..body]);
        buf.len = body;
        Ok(buf)
    }

    /// Append a segment.
    ///
    /// Encoders stay within capacity by construction (see the compile-time
    /// checks above), so this only guards against misuse.
    #[inline]
    pub fn push(&mut self, segment: Segment) -> Result<(), IuError> {
        if self.len + 1 >= WAVEFORM_CAPACITY {
            return Err(IuError::WaveformTooLong { len: self.len + 1 });
        }
        self.segments[self.len] = segment;
        self.len += 1;
        Ok(())
    }

    /// Append a segment inside an encoder.
    ///
    /// Encoder frame lengths are asserted against the capacity above, so the
    /// sentinel slot is never reached.
    #[inline]
    pub(crate) fn put(&mut self, segment: Segment) {
        self.segments[self.len] = segment;
        self.len += 1;
    }

    /// Segments before the sentinel.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there are no segments before the sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Segments before the sentinel.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments[..self.len]
    }

    /// Segments including the trailing sentinel.
    #[inline]
    pub fn as_terminated(&self) -> &[Segment] {
        &self.segments[..=self.len]
    }

    /// Total playback time in ticks (sentinel excluded).
    pub fn duration_ticks(&self) -> u32 {
        self.segments().iter().map(|s| s.ticks() as u32).sum()
    }

    /// Drop all segments.
    #[inline]
    pub fn clear(&mut self) {
        self.segments = [Segment::END; WAVEFORM_CAPACITY];
        self.len = 0;
    }
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_terminated() {
        let buf = WaveformBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.as_terminated(), &[Segment::END]);
    }

    #[test]
    fn test_from_segments_appends_sentinel() {
        let buf = WaveformBuffer::from_segments(&[Segment::mark(10), Segment::space(10)]).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.as_terminated().last(), Some(&Segment::END));
        assert_eq!(buf.duration_ticks(), 20);
    }

    #[test]
    fn test_from_segments_stops_at_sentinel() {
        let input = [Segment::mark(10), Segment::END, Segment::mark(50)];
        let buf = WaveformBuffer::from_segments(&input).unwrap();
        assert_eq!(buf.segments(), &[Segment::mark(10)]);
    }

    #[test]
    fn test_from_segments_too_long() {
        let input = [Segment::mark(10); WAVEFORM_CAPACITY];
        assert_eq!(
            WaveformBuffer::from_segments(&input),
            Err(IuError::WaveformTooLong { len: WAVEFORM_CAPACITY })
        );

        // One slot must stay free for the sentinel
        let input = [Segment::mark(10); WAVEFORM_CAPACITY - 1];
        assert!(WaveformBuffer::from_segments(&input).is_ok());
    }

    #[test]
    fn test_push_keeps_room_for_sentinel() {
        let mut buf = WaveformBuffer::new();
        for _ in 0..WAVEFORM_CAPACITY - 1 {
            buf.push(Segment::space(3)).unwrap();
        }
        assert!(buf.push(Segment::space(3)).is_err());
        assert_eq!(buf.as_terminated().len(), WAVEFORM_CAPACITY);
    }

    #[test]
    fn test_clear() {
        let mut buf = WaveformBuffer::from_segments(&[Segment::mark(9)]).unwrap();
        buf.clear();
        assert!(buf.is_empty());
    }
}
