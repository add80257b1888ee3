//! Stream accessor trait for the transport layer

use crate::{MeterError, MeterResult};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Stream accessor interface to a line-oriented byte source such as a meter's
/// optical or P1 port
///
/// Reads are bounded by the stream's timeout. A read that times out is not an
/// error: it returns whatever bytes arrived before the deadline.
#[async_trait]
pub trait StreamAccessor: Send {
    /// Check without blocking whether at least one byte can be read
    async fn bytes_available(&mut self) -> MeterResult<bool>;

    /// Read bytes up to and including `delimiter`
    ///
    /// # Returns
    ///
    /// The bytes read. The delimiter is missing from the result when the read
    /// timed out or the stream reached EOF first.
    async fn read_until(&mut self, delimiter: u8) -> MeterResult<Vec<u8>>;

    /// Read one line, including the trailing newline if it arrived in time
    async fn read_line(&mut self) -> MeterResult<Vec<u8>> {
        self.read_until(b'\n').await
    }

    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream
    async fn close(&mut self) -> MeterResult<()>;
}

/// Transport layer trait that extends StreamAccessor
#[async_trait]
pub trait TransportLayer: StreamAccessor {
    /// Open the physical layer connection
    async fn open(&mut self) -> MeterResult<()>;
}

/// Buffered [`StreamAccessor`] over any tokio reader
pub struct StreamReader<R> {
    reader: Option<BufReader<R>>,
    timeout: Option<Duration>,
}

impl<R> fmt::Debug for StreamReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("open", &self.reader.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<R> StreamReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap a reader
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying byte source
    /// * `timeout` - Upper bound for each blocking read
    pub fn new(inner: R, timeout: Option<Duration>) -> Self {
        Self {
            reader: Some(BufReader::new(inner)),
            timeout,
        }
    }

    fn reader_mut(&mut self) -> MeterResult<&mut BufReader<R>> {
        self.reader.as_mut().ok_or_else(|| {
            MeterError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Stream not connected",
            ))
        })
    }
}

#[async_trait]
impl<R> StreamAccessor for StreamReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn bytes_available(&mut self) -> MeterResult<bool> {
        let reader = self.reader_mut()?;
        if !reader.buffer().is_empty() {
            return Ok(true);
        }

        // A zero deadline polls the reader exactly once. Whatever it yields
        // stays in the buffer for the next read.
        match tokio::time::timeout(Duration::ZERO, reader.fill_buf()).await {
            Ok(Ok(buf)) => Ok(!buf.is_empty()),
            Ok(Err(e)) => Err(MeterError::Connection(e)),
            Err(_) => Ok(false),
        }
    }

    async fn read_until(&mut self, delimiter: u8) -> MeterResult<Vec<u8>> {
        let timeout = self.timeout;
        let reader = self.reader_mut()?;
        let mut buf = Vec::new();

        match timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, reader.read_until(delimiter, &mut buf)).await;
                match outcome {
                    Ok(result) => {
                        result?;
                    }
                    Err(_) => {
                        // read_until appends partial data to buf before yielding
                        log::debug!(
                            target: "lge360::transport",
                            "Read timed out after {:?} with {} bytes pending",
                            limit,
                            buf.len()
                        );
                    }
                }
            }
            None => {
                reader.read_until(delimiter, &mut buf).await?;
            }
        }

        Ok(buf)
    }

    fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    async fn close(&mut self) -> MeterResult<()> {
        self.reader = None;
        Ok(())
    }
}
