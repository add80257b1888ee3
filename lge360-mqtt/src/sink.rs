//! Publish sink abstraction

use async_trait::async_trait;
use lge360_core::MeterResult;
use std::fmt;

/// Destination for published messages
///
/// Implemented by [`crate::MqttSink`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Publish a payload on a topic
    ///
    /// # Arguments
    ///
    /// * `topic` - Full topic name
    /// * `payload` - Message body
    /// * `retained` - Whether the broker keeps the message for late subscribers
    async fn publish(&self, topic: &str, payload: Vec<u8>, retained: bool) -> MeterResult<()>;

    /// Close the session with the broker
    async fn disconnect(&self) -> MeterResult<()>;
}

/// Bridge liveness as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
