//! Telegram framer

use crate::statistics::FramerStatistics;
use lge360_core::{MeterError, MeterResult};
use lge360_transport::StreamAccessor;
use std::fmt;

/// Identification line that opens every telegram
pub const DEVICE_SIGNATURE: &str = "/LGF5E360";

/// Byte that closes every telegram
pub const TERMINATOR: u8 = b'!';

/// One framed telegram body, with surrounding whitespace removed
///
/// The body runs from just after the identification line up to and including
/// the terminator. When the terminator never arrived the body holds whatever
/// was read before the timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    body: String,
}

impl Telegram {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the body ends with the terminator
    pub fn is_complete(&self) -> bool {
        self.body.as_bytes().last() == Some(&TERMINATOR)
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Detects telegram boundaries in the meter's byte stream
///
/// The framer does not hold the stream: each [`TelegramFramer::read_cycle`]
/// borrows it for exactly one attempt.
#[derive(Debug, Default)]
pub struct TelegramFramer {
    statistics: FramerStatistics,
}

impl TelegramFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to read one telegram
    ///
    /// Returns `Ok(None)` right away when nothing is pending, and also when the
    /// pending line is not the identification line (that line is consumed and
    /// dropped). Only after the identification line does the framer block, on
    /// the terminator read, and that read is bounded by the stream's timeout.
    ///
    /// # Errors
    /// Stream failures and bytes that are not valid UTF-8.
    pub async fn read_cycle<S>(&mut self, stream: &mut S) -> MeterResult<Option<Telegram>>
    where
        S: StreamAccessor + ?Sized,
    {
        if !stream.bytes_available().await? {
            self.statistics.increment_idle_cycles();
            return Ok(None);
        }

        let line = decode(stream.read_line().await?)?;
        log::debug!(target: "lge360::telegram", "Raw message: {}", line);
        if line != DEVICE_SIGNATURE {
            self.statistics.increment_lines_discarded();
            return Ok(None);
        }

        let telegram = Telegram::new(decode(stream.read_until(TERMINATOR).await?)?);
        self.statistics.increment_telegrams_received();
        if !telegram.is_complete() {
            self.statistics.increment_incomplete_telegrams();
            log::warn!(
                target: "lge360::telegram",
                "Telegram terminator not received before timeout ({} bytes read)",
                telegram.body().len()
            );
        }
        log::debug!(target: "lge360::telegram", "Full telegram: {}", telegram);

        Ok(Some(telegram))
    }

    pub fn statistics(&self) -> &FramerStatistics {
        &self.statistics
    }
}

fn decode(bytes: Vec<u8>) -> MeterResult<String> {
    let text = String::from_utf8(bytes).map_err(|e| MeterError::Decode(e.to_string()))?;
    Ok(text
        .trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string())
}
