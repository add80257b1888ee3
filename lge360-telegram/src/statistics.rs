//! Framer statistics collection

/// Telegram framing statistics
///
/// Tracks how the framer's read cycles ended, for monitoring a meter
/// connection over time.
///
/// # Usage
/// Statistics are updated by [`crate::TelegramFramer`] on every read cycle.
/// Query them at any time through the framer or [`crate::MeterReader`]; the
/// bridge logs them on shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramerStatistics {
    /// Number of read cycles that found no pending bytes
    pub idle_cycles: u64,
    /// Lines read that were not the device identification line
    pub lines_discarded: u64,
    /// Telegrams framed, complete or not
    pub telegrams_received: u64,
    /// Telegrams whose terminator never arrived before the read timeout
    pub incomplete_telegrams: u64,
}

impl FramerStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_idle_cycles(&mut self) {
        self.idle_cycles += 1;
    }

    pub fn increment_lines_discarded(&mut self) {
        self.lines_discarded += 1;
    }

    pub fn increment_telegrams_received(&mut self) {
        self.telegrams_received += 1;
    }

    pub fn increment_incomplete_telegrams(&mut self) {
        self.incomplete_telegrams += 1;
    }

    /// Share of framed telegrams that were cut short, as a percentage
    ///
    /// Returns 0.0 if no telegram has been framed yet.
    pub fn incomplete_rate(&self) -> f64 {
        if self.telegrams_received == 0 {
            0.0
        } else {
            (self.incomplete_telegrams as f64 / self.telegrams_received as f64) * 100.0
        }
    }
}
