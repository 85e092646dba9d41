//! Module: ring
//!
//! Purpose: Receive ring buffer between the tick ISR (producer) and the
//! background (consumer).
//!
//! Architecture:
//! - N slots, N - 1 usable, mask-based wraparound
//! - Indices are stored already masked: `(head - tail) & MASK` is the fill level
//! - Full ring: the producer drops the oldest unread byte, so the most recent
//!   `N - 1` bytes always survive
//! - Producer and consumer both advance `tail` by compare-exchange, so a pop
//!   racing an overwrite retries instead of returning a dropped byte
//!
//! Safety: Safe. Slots are atomics, no unsafe blocks.

use core::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};

/// Default ring size (7 usable bytes).
pub const RX_RING_SIZE: usize = 8;

/// Receive ring buffer.
pub struct RxRing<const N: usize = RX_RING_SIZE> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    dropped: AtomicU32,
}

impl<const N: usize> RxRing<N> {
    const MASK: usize = N - 1;

    /// Create an empty ring.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Ring size must be power of 2");
        assert!(N >= 2, "Ring needs at least one usable slot");

        const ZERO: AtomicU8 = AtomicU8::new(0);
        Self {
            slots: [ZERO; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Usable capacity (`N - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Push a byte (producer side, never blocks).
    ///
    /// Returns `true` if the oldest unread byte was dropped to make room.
    ///
    /// # Timing
    ///
    /// O(1), at most one compare-exchange.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;
        let tail = self.tail.load(Ordering::Acquire);

        let mut overwrote = false;
        if next == tail {
            // A failed exchange means the consumer just made room.
            if self
                .tail
                .compare_exchange(tail, next_index::<N>(tail), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                overwrote = true;
            }
        }

        self.slots[head].store(byte, Ordering::Relaxed);
        self.head.store(next, Ordering::Release);
        overwrote
    }

    /// Pop the oldest byte (consumer side).
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);
            if tail == head {
                return None;
            }

            let byte = self.slots[tail].load(Ordering::Relaxed);
            if self
                .tail
                .compare_exchange(tail, next_index::<N>(tail), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(byte);
            }
        }
    }

    /// Unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & Self::MASK
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes dropped by overwrite since creation.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Discard all unread bytes (consumer side).
    ///
    /// Only `tail` moves, up to the current `head`; the producer's index is
    /// left alone so a push racing the reset never sees a false full ring.
    pub fn reset(&self) {
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);
            if self
                .tail
                .compare_exchange(tail, head, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
const fn next_index<const N: usize>(idx: usize) -> usize {
    (idx + 1) & (N - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let ring = RxRing::<8>::new();
        assert!(ring.is_empty());
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_capacity() {
        let ring = RxRing::<8>::new();
        assert_eq!(ring.capacity(), 7);
        for b in 0..7 {
            assert!(!ring.push(b));
        }
        assert_eq!(ring.len(), 7);
    }

    #[test]
    fn test_overwrite_drops_oldest() {
        let ring = RxRing::<4>::new();
        for b in 0..3 {
            ring.push(b);
        }
        assert!(ring.push(3));
        assert_eq!(ring.dropped(), 1);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
    }

    #[test]
    fn test_wraparound() {
        let ring = RxRing::<4>::new();
        for round in 0..10u8 {
            ring.push(round);
            ring.push(round.wrapping_add(100));
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round.wrapping_add(100)));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_reset() {
        let ring = RxRing::<8>::new();
        ring.push(9);
        ring.push(9);
        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_reset_keeps_producer_index() {
        let ring = RxRing::<8>::new();
        for b in 0..5 {
            ring.push(b);
        }
        assert_eq!(ring.pop(), Some(0));
        ring.reset();
        assert!(ring.is_empty());

        // A full ring's worth after the reset fits without overwriting
        for b in 10..17 {
            assert!(!ring.push(b));
        }
        assert_eq!(ring.dropped(), 0);
        assert_eq!(ring.len(), 7);
        assert_eq!(ring.pop(), Some(10));
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        use std::sync::Arc;
        use std::thread;

        let ring = Arc::new(RxRing::<8>::new());
        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for b in 0..=255u8 {
                    ring.push(b);
                }
            })
        };

        let mut received = 0;
        while !producer.is_finished() || !ring.is_empty() {
            if ring.pop().is_some() {
                received += 1;
            }
        }
        producer.join().unwrap();

        // Some bytes may be dropped, none duplicated
        assert!(received > 0);
        assert!(received + ring.dropped() as usize <= 256);
    }
}
