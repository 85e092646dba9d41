//! Shared test fixtures: mock pin bank and a two-engine serial wire.

#![allow(dead_code)]

use tiny_ir_uart::logging::LogStream;
use tiny_ir_uart::{Config, PinBank, TinyIrUart};

/// IR output state as seen by the pin bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrState {
    Released,
    Carrier(bool),
    Driven(bool),
}

/// Recording pin bank.
pub struct MockPins {
    pub ir: IrState,
    /// One entry per IR pin operation, in call order.
    pub ir_ops: Vec<IrState>,
    pub tx: bool,
    pub rx: bool,
    pub tx_writes: u32,
    pub rx_reads: u32,
}

impl Default for MockPins {
    fn default() -> Self {
        Self {
            ir: IrState::Released,
            ir_ops: Vec::new(),
            tx: true,
            rx: true,
            tx_writes: 0,
            rx_reads: 0,
        }
    }
}

impl PinBank for MockPins {
    fn ir_carrier(&mut self, on: bool) {
        self.ir = IrState::Carrier(on);
        self.ir_ops.push(self.ir);
    }

    fn ir_drive(&mut self, high: bool) {
        self.ir = IrState::Driven(high);
        self.ir_ops.push(self.ir);
    }

    fn ir_release(&mut self) {
        self.ir = IrState::Released;
        self.ir_ops.push(self.ir);
    }

    fn tx_write(&mut self, high: bool) {
        self.tx = high;
        self.tx_writes += 1;
    }

    fn rx_read(&mut self) -> bool {
        self.rx_reads += 1;
        self.rx
    }
}

/// Engine with private log streams, so tests never share the globals.
pub fn quiet_engine(config: Config) -> TinyIrUart {
    let isr: &'static LogStream = Box::leak(Box::new(LogStream::new()));
    let bg: &'static LogStream = Box::leak(Box::new(LogStream::new()));
    TinyIrUart::new(config).with_log_streams(isr, bg)
}

/// Two engines with crossed serial lines, ticked in lockstep.
///
/// Each step: tick `a`, carry `a.tx` to `b.rx` (falling edge → `b.on_rx_edge`),
/// tick `b`, carry `b.tx` to `a.rx`.
pub struct Wire {
    pub a: TinyIrUart,
    pub b: TinyIrUart,
    pub pins_a: MockPins,
    pub pins_b: MockPins,
    line_ab: bool,
    line_ba: bool,
}

impl Wire {
    pub fn new(config: Config) -> Self {
        Self {
            a: quiet_engine(config),
            b: quiet_engine(config),
            pins_a: MockPins::default(),
            pins_b: MockPins::default(),
            line_ab: true,
            line_ba: true,
        }
    }

    pub fn step(&mut self) {
        self.a.tick(&mut self.pins_a);
        let level = self.pins_a.tx;
        self.pins_b.rx = level;
        if self.line_ab && !level {
            self.b.on_rx_edge();
        }
        self.line_ab = level;

        self.b.tick(&mut self.pins_b);
        let level = self.pins_b.tx;
        self.pins_a.rx = level;
        if self.line_ba && !level {
            self.a.on_rx_edge();
        }
        self.line_ba = level;
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Step until both transmitters are done, plus `settle` ticks so the
    /// receivers finish their last frame. Returns ticks stepped.
    pub fn run_until_sent(&mut self, settle: usize) -> usize {
        let mut ticks = 0;
        while self.a.bytes_remaining_to_transmit() > 0 || self.b.bytes_remaining_to_transmit() > 0
        {
            self.step();
            ticks += 1;
            assert!(ticks < 1_000_000, "transmit never completed");
        }
        self.run(settle);
        ticks + settle
    }
}

/// Pop everything currently buffered.
pub fn drain_rx(engine: &TinyIrUart) -> Vec<u8> {
    core::iter::from_fn(|| engine.receive_byte()).collect()
}
