//! Non-blocking logging for tick and edge interrupt paths.
//!
//! ```text
//!  tick / edge ISR          LogStream<N>           background
//!  ───────────────          ────────────           ──────────
//!  rt_warn!(..) ──format──▶ [e0][e1][e2] ──drain──▶ log_drain::drain_logs(sink)
//!  into MsgBuf (stack)       fetch_add slots        may block on the sink
//! ```
//!
//! - Formatting happens into a fixed [`MsgBuf`] on the caller's stack
//! - A full stream drops the new entry and counts it
//! - Entries below a stream's level threshold are skipped before formatting
//! - Timestamps are engine ticks

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Longest message kept per entry; longer text is cut.
pub const MAX_MSG_LEN: usize = 48;

/// Entries per stream.
pub const LOG_BUFFER_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

/// One queued message.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Engine tick count at push time.
    pub timestamp: u32,
    pub level: LogLevel,
    pub len: u8,
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: LogEntry = LogEntry {
        timestamp: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message bytes actually written.
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.msg[..(self.len as usize).min(MAX_MSG_LEN)]
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Stack buffer the `rt_*!` macros format into.
///
/// Writes past [`MAX_MSG_LEN`] are cut at the last whole UTF-8 character and
/// never report an error, so formatting always runs to completion.
pub struct MsgBuf {
    buf: [u8; MAX_MSG_LEN],
    len: usize,
}

impl MsgBuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_MSG_LEN],
            len: 0,
        }
    }

    /// Format `args` into a fresh buffer.
    #[inline]
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut buf = Self::new();
        let _ = fmt::write(&mut buf, args);
        buf
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Default for MsgBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for MsgBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = MAX_MSG_LEN - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Lock-free log ring: many producers, one drain.
///
/// Producers reserve a slot with `fetch_add` on the write index; a producer
/// that finds the ring full hands its reservation back and bumps `dropped`.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    min_level: AtomicU8,
}

// SAFETY: every producer writes only the slot its fetch_add reserved; the
// single drain reads a slot only after write_idx has moved past it.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "log stream size must be a power of two");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            min_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    /// Most verbose level this stream accepts. Defaults to `Debug`.
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    /// Whether an entry at `level` would be kept.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.min_level.load(Ordering::Relaxed)
    }

    /// Queue one entry. Never blocks.
    ///
    /// Returns `false` if the entry was filtered out or the ring was full;
    /// only the latter counts as dropped.
    #[inline]
    pub fn push(&self, timestamp: u32, level: LogLevel, msg: &[u8]) -> bool {
        if !self.enabled(level) {
            return false;
        }

        let write = self.write_idx.fetch_add(1, Ordering::AcqRel);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.write_idx.fetch_sub(1, Ordering::AcqRel);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: slot `write` is reserved for this producer alone
        unsafe {
            let entry = &mut (*self.entries.get())[write as usize & Self::MASK];
            entry.timestamp = timestamp;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        true
    }

    /// Take the oldest entry. Single consumer only.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the slot at `read` is published and no producer can reach
        // it again until read_idx moves on
        let entry = unsafe { (*self.entries.get())[read as usize & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Entries lost to a full ring since the last [`reset_dropped`](Self::reset_dropped).
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        self.write_idx.load(Ordering::Acquire).wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format and queue one entry, skipping the formatting when the stream
/// filters `level` out.
///
/// ```ignore
/// rt_log!(LogLevel::Warn, ISR_LOG_STREAM, ticks, "rx overrun, dropped {}", n);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let stream = &$stream;
        let level = $level;
        if stream.enabled(level) {
            let msg = $crate::logging::MsgBuf::format(format_args!($($arg)*));
            stream.push($timestamp, level, msg.as_bytes());
        }
    }};
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamps<const N: usize>(stream: &LogStream<N>) -> Vec<u32> {
        core::iter::from_fn(|| stream.drain().map(|e| e.timestamp)).collect()
    }

    #[test]
    fn test_push_then_drain() {
        let stream = LogStream::<16>::new();
        assert!(stream.push(1000, LogLevel::Info, b"ir start"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.text(), b"ir start");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_full_stream_drops_newest() {
        let stream = LogStream::<4>::new();
        for t in 1..=4 {
            assert!(stream.push(t, LogLevel::Info, b"x"));
        }
        assert!(!stream.push(5, LogLevel::Info, b"x"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 4);

        // A rejected push must not leave a hole behind
        assert_eq!(stream.drain().map(|e| e.timestamp), Some(1));
        assert!(stream.push(6, LogLevel::Info, b"x"));
        assert_eq!(timestamps(&stream), vec![2, 3, 4, 6]);
    }

    #[test]
    fn test_level_filter() {
        let stream = LogStream::<8>::new();
        assert_eq!(stream.min_level(), LogLevel::Debug);

        stream.set_min_level(LogLevel::Warn);
        assert!(!stream.push(1, LogLevel::Debug, b"ir done"));
        assert!(!stream.push(2, LogLevel::Info, b"rx reset"));
        assert!(stream.push(3, LogLevel::Warn, b"rx overrun"));
        assert!(stream.push(4, LogLevel::Error, b"init failed"));

        // Filtered entries are not drops
        assert_eq!(stream.dropped(), 0);
        assert_eq!(timestamps(&stream), vec![3, 4]);
    }

    #[test]
    fn test_long_message_cut() {
        let stream = LogStream::<4>::new();
        stream.push(0, LogLevel::Warn, &[b'x'; MAX_MSG_LEN + 10]);
        assert_eq!(stream.drain().unwrap().text().len(), MAX_MSG_LEN);
    }

    #[test]
    fn test_msg_buf_cuts_on_char_boundary() {
        // 47 ASCII bytes leave one byte of room; 'µ' needs two
        let text = format!("{}µs", "a".repeat(MAX_MSG_LEN - 1));
        let msg = MsgBuf::format(format_args!("{}", text));
        assert_eq!(msg.as_bytes().len(), MAX_MSG_LEN - 1);
        assert!(core::str::from_utf8(msg.as_bytes()).is_ok());
    }

    #[test]
    fn test_macros_format_and_filter() {
        let stream = LogStream::<8>::new();
        crate::rt_info!(stream, 7, "tx start, {} bytes", 3);
        crate::rt_warn!(stream, 8, "busy");

        stream.set_min_level(LogLevel::Info);
        crate::rt_debug!(stream, 9, "ir done");

        let first = stream.drain().unwrap();
        assert_eq!(first.level, LogLevel::Info);
        assert_eq!(first.text(), b"tx start, 3 bytes");
        assert_eq!(stream.drain().unwrap().level, LogLevel::Warn);
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_tick_and_background_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let producers: Vec<_> = (0..2u32)
            .map(|ctx| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for t in 0..20 {
                        crate::rt_info!(*stream, ctx * 100 + t, "ctx {} t {}", ctx, t);
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        let mut seen = timestamps(&*stream);
        seen.sort_unstable();
        let expected: Vec<u32> = (0..20).chain(100..120).collect();
        assert_eq!(seen, expected);
        assert_eq!(stream.dropped(), 0);
    }
}
