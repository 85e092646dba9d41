//! Module: engine
//!
//! Purpose: Tick Scheduler and public API. One [`TinyIrUart`] owns the
//! waveform player, the UART transmitter/receiver and the receive ring.
//!
//! Architecture:
//! ```text
//!            timer ISR                      edge ISR
//!               │                              │
//!               ▼                              ▼
//!   tick(): player ─▶ tx ─▶ rx ─▶ ticks++   on_rx_edge(): arm rx
//!               │       │     │
//!            IR pin  TX pin  ring ◀── receive_byte() (background)
//! ```
//! - Fixed service order every tick, no skipping
//! - Background entry points only hand work over; they never touch
//!   tick-owned state directly
//! - Everything lives in `&self` atomics so one engine can sit in a `static`
//!
//! Safety: Safe. Unsafe handoffs live in `player` and `uart::tx`.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::Config;
use crate::error::IuError;
use crate::fault::{FaultCode, FaultState};
use crate::hal::PinBank;
use crate::log_globals::{BG_LOG_STREAM, ISR_LOG_STREAM};
use crate::logging::LogStream;
use crate::player::{PlayerTick, WaveformPlayer};
use crate::protocol::{encode_nec, encode_rc, RcFrame};
use crate::ring::RxRing;
use crate::uart::{RxTick, TxTick, UartRx, UartTx};
use crate::waveform::WaveformBuffer;
use crate::{rt_debug, rt_info, rt_warn};

/// The tick engine.
///
/// # Usage
///
/// ```ignore
/// static ENGINE: TinyIrUart = TinyIrUart::new(Config::DEFAULT);
///
/// // timer ISR, once per tick
/// ENGINE.tick(&mut pins);
///
/// // receive-pin falling edge ISR
/// ENGINE.on_rx_edge();
///
/// // background
/// ENGINE.send_nec(0x04, 0x08)?;
/// while !ENGINE.is_waveform_free() {}
/// ```
pub struct TinyIrUart {
    config: Config,
    player: WaveformPlayer,
    tx: UartTx,
    rx: UartRx,
    ring: RxRing,
    ticks: AtomicU32,
    fault: FaultState,
    isr_log: Option<&'static LogStream>,
    bg_log: Option<&'static LogStream>,
}

impl TinyIrUart {
    /// Create an engine logging to the global streams.
    ///
    /// A missing TX pin disables `start_transmit`; a missing RX pin makes
    /// the receiver ignore edges.
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            player: WaveformPlayer::new(config.modulated),
            tx: UartTx::new(config.baud, config.tx_pin.is_some()),
            rx: UartRx::new(config.baud, config.rx_pin.is_some()),
            ring: RxRing::new(),
            ticks: AtomicU32::new(0),
            fault: FaultState::new(),
            isr_log: None,
            bg_log: None,
        }
    }

    /// Route logs to dedicated streams instead of the globals.
    pub const fn with_log_streams(
        mut self,
        isr: &'static LogStream,
        bg: &'static LogStream,
    ) -> Self {
        self.isr_log = Some(isr);
        self.bg_log = Some(bg);
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    fn isr_log(&self) -> &'static LogStream {
        self.isr_log.unwrap_or(&ISR_LOG_STREAM)
    }

    #[inline]
    fn bg_log(&self) -> &'static LogStream {
        self.bg_log.unwrap_or(&BG_LOG_STREAM)
    }

    // ========================================================================
    // Interrupt context
    // ========================================================================

    /// Service all three state machines for one tick.
    ///
    /// # Timing
    ///
    /// Bounded: each machine does O(1) work and at most one pin operation.
    #[inline]
    pub fn tick<P: PinBank>(&self, pins: &mut P) {
        let now = self.ticks.load(Ordering::Relaxed);

        if self.player.tick(pins) == PlayerTick::Finished {
            rt_debug!(self.isr_log(), now, "ir done");
        }

        if self.tx.tick(pins) == TxTick::Complete {
            rt_debug!(self.isr_log(), now, "tx done");
        }

        if let RxTick::Received { overwrote: true, .. } = self.rx.tick(pins, &self.ring) {
            let dropped = self.ring.dropped();
            self.fault.set(FaultCode::RxOverrun, dropped);
            rt_warn!(self.isr_log(), now, "rx overrun, dropped {}", dropped);
        }

        self.ticks.store(now.wrapping_add(1), Ordering::Relaxed);
    }

    /// Receive-pin edge event. Returns `true` if it armed the receiver.
    #[inline]
    pub fn on_rx_edge(&self) -> bool {
        self.rx.on_edge()
    }

    // ========================================================================
    // Background
    // ========================================================================

    /// Start playing a prepared waveform.
    pub fn send_waveform(&self, waveform: &WaveformBuffer) -> Result<(), IuError> {
        let now = self.ticks();
        match self.player.play(waveform) {
            Ok(()) => {
                rt_debug!(self.bg_log(), now, "ir start, {} segments", waveform.len());
                Ok(())
            }
            Err(e) => {
                rt_warn!(self.bg_log(), now, "ir rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Encode and play an NEC frame.
    pub fn send_nec(&self, address: u8, command: u8) -> Result<(), IuError> {
        self.send_waveform(&encode_nec(address, command))
    }

    /// Encode and play an RC5/RC6-style frame.
    pub fn send_rc(&self, frame: &RcFrame) -> Result<(), IuError> {
        self.send_waveform(&encode_rc(frame))
    }

    /// Queue bytes for the software UART.
    pub fn start_transmit(&self, data: &[u8]) -> Result<(), IuError> {
        let now = self.ticks();
        match self.tx.start(data) {
            Ok(()) => {
                rt_debug!(self.bg_log(), now, "tx start, {} bytes", data.len());
                Ok(())
            }
            Err(e) => {
                rt_warn!(self.bg_log(), now, "tx rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Pop the oldest received byte.
    #[inline]
    pub fn receive_byte(&self) -> Option<u8> {
        self.ring.pop()
    }

    #[inline]
    pub fn is_waveform_free(&self) -> bool {
        self.player.is_free()
    }

    #[inline]
    pub fn bytes_remaining_to_transmit(&self) -> usize {
        self.tx.remaining()
    }

    #[inline]
    pub fn bytes_available_to_receive(&self) -> usize {
        self.ring.len()
    }

    /// Drop any frame in progress and every unread byte.
    pub fn reset_receiver(&self) {
        self.rx.reset();
        self.ring.reset();
        rt_info!(self.bg_log(), self.ticks(), "rx reset");
    }

    /// Ticks serviced since creation (wraps).
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fault(&self) -> &FaultState {
        &self.fault
    }

    /// Bytes lost to receive-ring overwrite since creation.
    #[inline]
    pub fn rx_dropped(&self) -> u32 {
        self.ring.dropped()
    }

    /// Receive ring capacity in bytes.
    #[inline]
    pub fn rx_capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl Default for TinyIrUart {
    fn default() -> Self {
        Self::new(Config::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    struct NullPins;

    impl PinBank for NullPins {
        fn ir_carrier(&mut self, _on: bool) {}
        fn ir_drive(&mut self, _high: bool) {}
        fn ir_release(&mut self) {}
        fn tx_write(&mut self, _high: bool) {}
        fn rx_read(&mut self) -> bool {
            true
        }
    }

    fn quiet(config: Config) -> TinyIrUart {
        let isr: &'static LogStream = Box::leak(Box::new(LogStream::new()));
        let bg: &'static LogStream = Box::leak(Box::new(LogStream::new()));
        TinyIrUart::new(config).with_log_streams(isr, bg)
    }

    #[test]
    fn test_tick_counter() {
        let engine = quiet(Config::DEFAULT);
        for _ in 0..5 {
            engine.tick(&mut NullPins);
        }
        assert_eq!(engine.ticks(), 5);
    }

    #[test]
    fn test_busy_waveform_logged() {
        let engine = quiet(Config::DEFAULT);
        let wf = WaveformBuffer::from_segments(&[Segment::mark(10)]).unwrap();
        engine.send_waveform(&wf).unwrap();
        assert_eq!(engine.send_nec(1, 2), Err(IuError::WaveformBusy));

        let bg = engine.bg_log();
        assert_eq!(bg.pending(), 2);
        bg.drain();
        let entry = bg.drain().unwrap();
        assert_eq!(entry.level, crate::logging::LogLevel::Warn);
    }

    #[test]
    fn test_disabled_pins() {
        let engine = quiet(Config::DEFAULT.with_tx_pin(None).with_rx_pin(None));
        assert_eq!(engine.start_transmit(b"hi"), Err(IuError::TransmitDisabled));
        assert!(!engine.on_rx_edge());
    }
}
