//! Module: uart::tx
//!
//! Purpose: Software UART transmitter. Shifts bytes out one bit per
//! `divisor` ticks.
//!
//! Architecture:
//! - `start()` copies the caller's bytes into an owned slot, then hands the
//!   slot to the tick path (IDLE → LOADING → ACTIVE)
//! - Only the tick path retires bytes and returns to IDLE
//! - `remaining()` is the background's completion poll
//!
//! Safety: One UnsafeCell slot, guarded by the phase handoff.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use super::{FRAME_END, LAST_DATA_BIT, START_BIT};
use crate::config::BaudDivisor;
use crate::error::IuError;
use crate::hal::PinBank;

/// Bytes one transmit request may carry.
pub const TX_SLOT_SIZE: usize = 64;

const IDLE: u8 = 0;
const LOADING: u8 = 1;
const ACTIVE: u8 = 2;

/// Outcome of one transmitter tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxTick {
    Idle,
    /// Mid-byte.
    Busy,
    /// One byte retired, more to go.
    ByteDone,
    /// Last byte retired. Transmitter idle again.
    Complete,
}

/// Software UART transmitter.
pub struct UartTx<const N: usize = TX_SLOT_SIZE> {
    phase: AtomicU8,
    remaining: AtomicUsize,
    cursor: AtomicUsize,
    shift: AtomicU8,
    bit: AtomicU8,
    countdown: AtomicU8,
    divisor: u8,
    enabled: bool,
    slot: UnsafeCell<[u8; N]>,
}

// SAFETY: The slot is written only by the background while phase == LOADING
// and read only by the tick path while phase == ACTIVE.
unsafe impl<const N: usize> Sync for UartTx<N> {}

impl<const N: usize> UartTx<N> {
    /// Create an idle transmitter.
    ///
    /// A disabled transmitter rejects every `start()` and never touches the pin.
    pub const fn new(baud: BaudDivisor, enabled: bool) -> Self {
        Self {
            phase: AtomicU8::new(IDLE),
            remaining: AtomicUsize::new(0),
            cursor: AtomicUsize::new(0),
            shift: AtomicU8::new(0),
            bit: AtomicU8::new(START_BIT),
            countdown: AtomicU8::new(0),
            divisor: baud.ticks_per_bit(),
            enabled,
            slot: UnsafeCell::new([0; N]),
        }
    }

    /// Slot capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes not yet fully sent. 0 means idle.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Queue `data` for transmission.
    ///
    /// The first start bit goes out `divisor` ticks later.
    pub fn start(&self, data: &[u8]) -> Result<(), IuError> {
        if !self.enabled {
            return Err(IuError::TransmitDisabled);
        }
        if data.is_empty() {
            return Err(IuError::EmptyTransmit);
        }
        if data.len() > N {
            return Err(IuError::TransmitTooLong {
                len: data.len(),
                capacity: N,
            });
        }

        self.phase
            .compare_exchange(IDLE, LOADING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| IuError::TransmitBusy)?;

        // SAFETY: LOADING is held, the tick path does not touch the slot.
        unsafe {
            let slot = &mut *self.slot.get();
            slot[..data.len()].copy_from_slice(data);
        }

        self.cursor.store(0, Ordering::Relaxed);
        self.shift.store(data[0], Ordering::Relaxed);
        self.bit.store(START_BIT, Ordering::Relaxed);
        self.countdown.store(self.divisor - 1, Ordering::Relaxed);
        self.remaining.store(data.len(), Ordering::Release);
        self.phase.store(ACTIVE, Ordering::Release);
        Ok(())
    }

    /// Advance one tick.
    ///
    /// # Timing
    ///
    /// O(1), at most one pin write.
    #[inline]
    pub fn tick<P: PinBank>(&self, pins: &mut P) -> TxTick {
        if self.phase.load(Ordering::Acquire) != ACTIVE {
            return TxTick::Idle;
        }

        let countdown = self.countdown.load(Ordering::Relaxed);
        if countdown > 0 {
            self.countdown.store(countdown - 1, Ordering::Relaxed);
            return TxTick::Busy;
        }
        self.countdown.store(self.divisor - 1, Ordering::Relaxed);

        let bit = self.bit.load(Ordering::Relaxed);
        match bit {
            START_BIT => pins.tx_write(false),
            1..=LAST_DATA_BIT => {
                let shift = self.shift.load(Ordering::Relaxed);
                pins.tx_write(shift & 1 != 0);
                self.shift.store(shift >> 1, Ordering::Relaxed);
            }
            _ => pins.tx_write(true),
        }

        if bit < FRAME_END {
            self.bit.store(bit + 1, Ordering::Relaxed);
            return TxTick::Busy;
        }

        // Stop bits done: retire the byte
        self.bit.store(START_BIT, Ordering::Relaxed);
        let remaining = self.remaining.load(Ordering::Relaxed) - 1;
        if remaining == 0 {
            self.remaining.store(0, Ordering::Release);
            self.phase.store(IDLE, Ordering::Release);
            return TxTick::Complete;
        }

        let cursor = self.cursor.load(Ordering::Relaxed) + 1;
        // SAFETY: ACTIVE is held; cursor < start length <= N.
        let next = unsafe { (*self.slot.get()).get(cursor).copied() }.unwrap_or(0xFF);
        self.cursor.store(cursor, Ordering::Relaxed);
        self.shift.store(next, Ordering::Relaxed);
        self.remaining.store(remaining, Ordering::Release);
        TxTick::ByteDone
    }
}
