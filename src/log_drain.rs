//! Log drain: formats queued log entries into a blocking text sink.
//!
//! Runs in the background only. The sink is anything implementing
//! `core::fmt::Write`: a UART driver wrapper on target, a `String` on host.
//!
//! # Output format
//!
//! ```text
//! [      1234] INFO: tx done
//! [WARN] Dropped: ISR=3, BG=0
//! ```

use core::fmt::Write;

use crate::log_globals::{BG_LOG_STREAM, ISR_LOG_STREAM};
use crate::logging::{LogEntry, LogStream};

/// Format log entry as `[timestamp] LEVEL: message\n`.
pub fn format_log_entry<W: Write>(entry: &LogEntry, sink: &mut W) -> core::fmt::Result {
    write!(
        sink,
        "[{:10}] {}: {}\n",
        entry.timestamp,
        entry.level.as_str(),
        core::str::from_utf8(entry.text()).unwrap_or("<invalid utf8>")
    )
}

/// Drain every pending entry of one stream into `sink`.
///
/// Returns the number of entries written.
pub fn drain_stream<W: Write, const N: usize>(stream: &LogStream<N>, sink: &mut W) -> usize {
    let mut written = 0;
    while let Some(entry) = stream.drain() {
        let _ = format_log_entry(&entry, sink);
        written += 1;
    }
    written
}

/// Write a dropped-message report if either stream dropped anything, then
/// reset both counters. Returns `true` if a report was written.
pub fn report_dropped<W: Write, const N: usize>(
    isr: &LogStream<N>,
    bg: &LogStream<N>,
    sink: &mut W,
) -> bool {
    let isr_dropped = isr.dropped();
    let bg_dropped = bg.dropped();
    if isr_dropped == 0 && bg_dropped == 0 {
        return false;
    }

    let _ = write!(sink, "[WARN] Dropped: ISR={}, BG={}\n", isr_dropped, bg_dropped);
    isr.reset_dropped();
    bg.reset_dropped();
    true
}

/// Drain the global ISR stream first, then the background stream, then
/// report drops. Returns the number of entries written.
pub fn drain_logs<W: Write>(sink: &mut W) -> usize {
    let written = drain_stream(&ISR_LOG_STREAM, sink) + drain_stream(&BG_LOG_STREAM, sink);
    report_dropped(&ISR_LOG_STREAM, &BG_LOG_STREAM, sink);
    written
}
