//! Meter reader: one read cycle from bytes to a reading set

use crate::filter::ZeroValueFilter;
use crate::framer::{Telegram, TelegramFramer};
use crate::mapper::SemanticMapper;
use crate::parser::ObisRecordParser;
use crate::reading::ReadingSet;
use crate::registry::Registry;
use crate::reporter::UnhandledCodeReporter;
use crate::statistics::FramerStatistics;
use lge360_core::MeterResult;
use lge360_transport::StreamAccessor;
use std::sync::Arc;

/// Reads telegrams from a meter stream and decodes them into readings
///
/// The reader holds the stream exclusively; the process that created it is
/// responsible for calling [`MeterReader::close`] on shutdown.
///
/// # Usage Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use lge360_telegram::{MeterReader, Registry};
/// use lge360_transport::{SerialSettings, SerialTransport, TransportLayer};
///
/// # async fn example() -> lge360_core::MeterResult<()> {
/// let settings = SerialSettings::new("/dev/ttyUSB0".to_string(), 115200);
/// let mut transport = SerialTransport::new(settings);
/// transport.open().await?;
/// let mut reader = MeterReader::new(transport, Arc::new(Registry::e360()));
/// if let Some(readings) = reader.read().await? {
///     println!("{:?}", readings.values());
/// }
/// reader.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MeterReader<S> {
    stream: S,
    framer: TelegramFramer,
    mapper: SemanticMapper,
    filter: ZeroValueFilter,
    reporter: UnhandledCodeReporter,
}

impl<S> MeterReader<S>
where
    S: StreamAccessor,
{
    pub fn new(stream: S, registry: Arc<Registry>) -> Self {
        Self {
            stream,
            framer: TelegramFramer::new(),
            mapper: SemanticMapper::new(Arc::clone(&registry)),
            filter: ZeroValueFilter::default(),
            reporter: UnhandledCodeReporter::new(registry),
        }
    }

    /// Run one read cycle
    ///
    /// Returns `Ok(None)` when no telegram started this cycle. A framed
    /// telegram always yields `Some`, possibly an empty set when nothing in it
    /// could be decoded or everything was filtered out.
    ///
    /// # Errors
    /// Only transport failures: stream I/O errors and undecodable bytes.
    pub async fn read(&mut self) -> MeterResult<Option<ReadingSet>> {
        let Some(telegram) = self.framer.read_cycle(&mut self.stream).await? else {
            return Ok(None);
        };

        let readings = self.decode(&telegram);
        log::info!(target: "lge360::telegram", "New reading: {:?}", readings.values());

        let unhandled = self.reporter.report(&telegram);
        if !unhandled.is_empty() {
            log::warn!(target: "lge360::telegram", "Unhandled OBIS codes: {:?}", unhandled);
        }

        Ok(Some(readings))
    }

    /// Parse, label and filter a telegram that has already been framed
    pub fn decode(&self, telegram: &Telegram) -> ReadingSet {
        let readings = ObisRecordParser::parse(telegram)
            .iter()
            .map(|record| self.mapper.map(record))
            .collect::<Vec<_>>();
        self.filter.apply(readings)
    }

    pub fn statistics(&self) -> &FramerStatistics {
        self.framer.statistics()
    }

    /// Close the underlying stream
    pub async fn close(&mut self) -> MeterResult<()> {
        self.stream.close().await
    }
}
