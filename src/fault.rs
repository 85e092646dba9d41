//! Faults raised from tick context.
//!
//! The tick ISR has nobody to return an error to. When it loses data it
//! records a fault here and keeps going; the background picks the fault up
//! with [`FaultState::take`]. Recording never alters the data path.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    None = 0,

    /// The receive ring was full and its oldest unread byte was overwritten.
    /// Data holds the ring's total dropped count.
    RxOverrun = 1,
}

impl FaultCode {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => FaultCode::RxOverrun,
            _ => FaultCode::None,
        }
    }
}

/// Latest fault plus a lifetime counter.
///
/// One writer (tick ISR), one reader (background). A newer fault overwrites
/// an unread one; `count` still sees both.
///
/// ```ignore
/// // background poll
/// if let Some(f) = ENGINE.fault().take() {
///     rt_warn!(BG_LOG_STREAM, now, "fault {:?} data={}", f.code, f.data);
/// }
/// ```
pub struct FaultState {
    pending: AtomicBool,
    code: AtomicU8,
    data: AtomicU32,
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            code: AtomicU8::new(FaultCode::None as u8),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault. Tick context.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Relaxed);
        self.data.store(data, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        // Publishes code and data
        self.pending.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Code of the latest fault, `None` before the first one.
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_raw(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Faults recorded since creation. Never cleared.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Acknowledge the pending fault without reading it.
    #[inline]
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Current state, pending or not.
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }

    /// Read and acknowledge the pending fault in one step.
    pub fn take(&self) -> Option<FaultSnapshot> {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(FaultSnapshot {
            active: true,
            code: self.code(),
            data: self.data(),
            count: self.count(),
        })
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
