//! Module: segment
//!
//! Purpose: Waveform Segment type. One byte describes how long the IR pin holds
//! a level before the next change.
//!
//! Architecture:
//! - Compact 1-byte tagged format, kept bit-compatible with stored waveforms
//! - Durations are in ticks (default tick = 26µs)
//! - A duration below [`MIN_TICKS`] is the end-of-waveform sentinel
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Shortest duration the player treats as a real segment.
///
/// Anything shorter terminates playback and releases the IR pin.
pub const MIN_TICKS: u8 = 2;

/// Longest duration one segment can hold (7 bits).
///
/// At 26µs per tick this is ~3.3ms. Use several segments for longer holds.
pub const MAX_TICKS: u8 = 0x7F;

/// Level bit mask (bit 7).
const LEVEL_BIT: u8 = 0x80;

/// Duration mask (bits 6-0).
const TICKS_MASK: u8 = 0x7F;

/// IR output level for a segment.
///
/// `Mark` is "carrier on" (or pin high when unmodulated),
/// `Space` is "carrier off" (pin low).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Space,
    Mark,
}

impl Level {
    /// True for [`Level::Mark`].
    #[inline]
    pub const fn is_mark(self) -> bool {
        matches!(self, Level::Mark)
    }
}

/// A single waveform segment.
///
/// Bit layout:
/// ```text
/// [level:1][ticks:7]
///  bit 7    bits 6-0
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment(u8);

impl Segment {
    /// End-of-waveform sentinel (space, 0 ticks).
    pub const END: Self = Self(0);

    /// Create a segment, or `None` if `ticks` does not fit in 7 bits.
    pub const fn try_new(level: Level, ticks: u8) -> Option<Self> {
        if ticks > MAX_TICKS {
            return None;
        }
        Some(Self::pack(level, ticks))
    }

    /// Create a segment, clamping `ticks` to [`MAX_TICKS`].
    pub const fn saturating(level: Level, ticks: u8) -> Self {
        let ticks = if ticks > MAX_TICKS { MAX_TICKS } else { ticks };
        Self::pack(level, ticks)
    }

    /// Mark (carrier on) for `ticks`. Clamped to [`MAX_TICKS`].
    #[inline]
    pub const fn mark(ticks: u8) -> Self {
        Self::saturating(Level::Mark, ticks)
    }

    /// Space (carrier off) for `ticks`. Clamped to [`MAX_TICKS`].
    #[inline]
    pub const fn space(ticks: u8) -> Self {
        Self::saturating(Level::Space, ticks)
    }

    /// Reinterpret a raw stored byte.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw byte value.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Level this segment drives.
    #[inline]
    pub const fn level(&self) -> Level {
        if self.0 & LEVEL_BIT != 0 {
            Level::Mark
        } else {
            Level::Space
        }
    }

    /// Duration in ticks.
    #[inline]
    pub const fn ticks(&self) -> u8 {
        self.0 & TICKS_MASK
    }

    /// Check if this segment terminates playback.
    #[inline]
    pub const fn is_end(&self) -> bool {
        self.ticks() < MIN_TICKS
    }

    const fn pack(level: Level, ticks: u8) -> Self {
        match level {
            Level::Mark => Self(LEVEL_BIT | ticks),
            Level::Space => Self(ticks),
        }
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::END
    }
}

// ============================================================================
// Tests
// ============================================================================
