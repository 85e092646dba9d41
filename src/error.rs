//! Error types returned by background entry points.
//!
//! Tick-context code never returns these; anomalies there go to
//! [`FaultState`](crate::fault::FaultState) instead.

/// Error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IuError {
    /// E01: Waveform player is still playing
    WaveformBusy,
    /// E02: Transmitter still has bytes to send
    TransmitBusy,
    /// E03: Nothing to transmit
    EmptyTransmit,
    /// E04: Transmit request larger than the transmit slot
    TransmitTooLong { len: usize, capacity: usize },
    /// E05: Waveform does not fit with its sentinel
    WaveformTooLong { len: usize },
    /// E06: No transmit pin configured
    TransmitDisabled,
    /// E07: Baud divisor is not one of 32, 16, 8, 4
    InvalidBaudDivisor(u8),
    /// E08: Two roles assigned to the same pin
    PinConflict,
}

impl IuError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::WaveformBusy => "E01",
            Self::TransmitBusy => "E02",
            Self::EmptyTransmit => "E03",
            Self::TransmitTooLong { .. } => "E04",
            Self::WaveformTooLong { .. } => "E05",
            Self::TransmitDisabled => "E06",
            Self::InvalidBaudDivisor(_) => "E07",
            Self::PinConflict => "E08",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::WaveformBusy => "waveform busy",
            Self::TransmitBusy => "transmit busy",
            Self::EmptyTransmit => "empty transmit",
            Self::TransmitTooLong { .. } => "transmit too long",
            Self::WaveformTooLong { .. } => "waveform too long",
            Self::TransmitDisabled => "transmit disabled",
            Self::InvalidBaudDivisor(_) => "invalid baud divisor",
            Self::PinConflict => "pin conflict",
        }
    }
}

impl core::fmt::Display for IuError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        match self {
            Self::TransmitTooLong { len, capacity } => write!(f, " ({} > {})", len, capacity),
            Self::WaveformTooLong { len } => write!(f, " ({} segments)", len),
            Self::InvalidBaudDivisor(d) => write!(f, " ({})", d),
            _ => Ok(()),
        }
    }
}
