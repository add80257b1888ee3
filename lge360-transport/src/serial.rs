//! Serial port transport implementation

use crate::stream::{StreamAccessor, StreamReader, TransportLayer};
use crate::{MeterError, MeterResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio_serial::SerialStream;

/// Serial port transport layer settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Option<Duration>,
}

impl SerialSettings {
    /// Create new serial settings with 8N1 framing and a one second timeout
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self::with_timeout(port_name, baud_rate, Duration::from_secs(1))
    }

    /// Create serial settings with timeout
    pub fn with_timeout(port_name: String, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
            timeout: Some(timeout),
        }
    }
}

/// Serial port transport layer implementation
#[derive(Debug)]
pub struct SerialTransport {
    stream: Option<StreamReader<SerialStream>>,
    settings: SerialSettings,
}

impl SerialTransport {
    /// Create a new serial transport layer; the port is opened by [`TransportLayer::open`]
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
        }
    }

    fn stream_mut(&mut self) -> MeterResult<&mut StreamReader<SerialStream>> {
        self.stream.as_mut().ok_or_else(|| {
            MeterError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial stream not connected",
            ))
        })
    }
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> MeterResult<()> {
        if self.stream.is_some() {
            return Err(MeterError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let mut builder = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control);
        if let Some(timeout) = self.settings.timeout {
            builder = builder.timeout(timeout);
        }

        let stream = SerialStream::open(&builder).map_err(|e| {
            MeterError::Connection(std::io::Error::other(format!(
                "Failed to open serial port {}: {}",
                self.settings.port_name, e
            )))
        })?;

        log::info!(
            target: "lge360::transport",
            "Opened serial port {} at {} baud",
            self.settings.port_name,
            self.settings.baud_rate
        );
        self.stream = Some(StreamReader::new(stream, self.settings.timeout));
        Ok(())
    }
}

#[async_trait]
impl StreamAccessor for SerialTransport {
    async fn bytes_available(&mut self) -> MeterResult<bool> {
        self.stream_mut()?.bytes_available().await
    }

    async fn read_until(&mut self, delimiter: u8) -> MeterResult<Vec<u8>> {
        self.stream_mut()?.read_until(delimiter).await
    }

    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    async fn close(&mut self) -> MeterResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.close().await?;
            log::info!(target: "lge360::transport", "Closed serial port {}", self.settings.port_name);
        }
        Ok(())
    }
}
