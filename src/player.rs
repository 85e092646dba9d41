//! Module: player
//!
//! Purpose: Waveform Player. Steps through a sentinel-terminated segment list,
//! holding the IR output at each level for the segment's tick count.
//!
//! Architecture:
//! ```text
//! Background                 Player                  Tick ISR
//! ──────────                 ──────                  ────────
//! play(buf) ── CAS ───▶ IDLE → LOADING → PLAYING ◀── tick()
//!                          ▲                            │
//!                          └──── sentinel reached ──────┘
//! ```
//! - The background only writes the slot while it holds LOADING
//! - The tick path only reads the slot while PLAYING
//! - Only the tick path returns the player to IDLE
//!
//! Safety: One UnsafeCell slot, guarded by the phase handoff above.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::IuError;
use crate::hal::PinBank;
use crate::segment::{Level, Segment};
use crate::waveform::{WaveformBuffer, WAVEFORM_CAPACITY};

const IDLE: u8 = 0;
const LOADING: u8 = 1;
const PLAYING: u8 = 2;

/// Outcome of one player tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerTick {
    /// Nothing loaded.
    Idle,
    /// Mid-waveform.
    Playing,
    /// Sentinel reached this tick. Pin released, player idle again.
    Finished,
}

/// Waveform Player state machine.
pub struct WaveformPlayer {
    phase: AtomicU8,
    /// Index of the next segment to load.
    cursor: AtomicU8,
    /// Ticks left on the current segment.
    remaining: AtomicU8,
    modulated: bool,
    slot: UnsafeCell<[Segment; WAVEFORM_CAPACITY]>,
}

// SAFETY: The slot is written only by the background while phase == LOADING
// and read only by the tick path while phase == PLAYING. The phase store
// (Release) / load (Acquire) pair orders the slot contents.
unsafe impl Sync for WaveformPlayer {}

impl WaveformPlayer {
    /// Create an idle player.
    ///
    /// `modulated` selects carrier on/off for marks instead of a static level.
    pub const fn new(modulated: bool) -> Self {
        Self {
            phase: AtomicU8::new(IDLE),
            cursor: AtomicU8::new(0),
            remaining: AtomicU8::new(0),
            modulated,
            slot: UnsafeCell::new([Segment::END; WAVEFORM_CAPACITY]),
        }
    }

    /// True when a new waveform may be started.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.phase.load(Ordering::Acquire) == IDLE
    }

    /// Start playing `waveform`.
    ///
    /// The first segment is applied on the next tick. Returns `WaveformBusy`
    /// if a waveform is still playing; the running one is left untouched.
    pub fn play(&self, waveform: &WaveformBuffer) -> Result<(), IuError> {
        self.phase
            .compare_exchange(IDLE, LOADING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| IuError::WaveformBusy)?;

        let src = waveform.as_terminated();
        // SAFETY: LOADING is held, the tick path does not touch the slot.
        unsafe {
            let slot = &mut *self.slot.get();
            slot[..src.len()].copy_from_slice(src);
        }

        self.cursor.store(0, Ordering::Relaxed);
        // One-tick lead
        self.remaining.store(1, Ordering::Relaxed);
        self.phase.store(PLAYING, Ordering::Release);
        Ok(())
    }

    /// Advance one tick.
    ///
    /// # Timing
    ///
    /// O(1), at most one pin operation.
    #[inline]
    pub fn tick<P: PinBank>(&self, pins: &mut P) -> PlayerTick {
        if self.phase.load(Ordering::Acquire) != PLAYING {
            return PlayerTick::Idle;
        }

        let remaining = self.remaining.load(Ordering::Relaxed).saturating_sub(1);
        if remaining > 0 {
            self.remaining.store(remaining, Ordering::Relaxed);
            return PlayerTick::Playing;
        }

        let cursor = self.cursor.load(Ordering::Relaxed) as usize;
        // SAFETY: PLAYING is held, the background does not touch the slot.
        let segment = unsafe { (*self.slot.get()).get(cursor).copied() }.unwrap_or(Segment::END);

        if segment.is_end() {
            pins.ir_release();
            self.remaining.store(0, Ordering::Relaxed);
            self.phase.store(IDLE, Ordering::Release);
            return PlayerTick::Finished;
        }

        self.apply(pins, segment.level());
        self.remaining.store(segment.ticks(), Ordering::Relaxed);
        self.cursor.store(cursor as u8 + 1, Ordering::Relaxed);
        PlayerTick::Playing
    }

    #[inline]
    fn apply<P: PinBank>(&self, pins: &mut P, level: Level) {
        if self.modulated {
            pins.ir_carrier(level.is_mark());
        } else {
            pins.ir_drive(level.is_mark());
        }
    }
}
