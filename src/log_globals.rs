//! Global log stream instances.
//!
//! One stream per execution context, drained together by
//! [`drain_logs`](crate::log_drain::drain_logs).

use crate::logging::LogStream;

/// Tick/edge ISR log stream.
///
/// Producers: the tick and edge interrupt paths. Consumer: the log drain.
pub static ISR_LOG_STREAM: LogStream = LogStream::new();

/// Background log stream.
///
/// Producers: background entry points (send, transmit, reset). Consumer: the
/// log drain.
pub static BG_LOG_STREAM: LogStream = LogStream::new();
