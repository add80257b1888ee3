//! Reading and availability publisher

use crate::discovery::{DeviceInfo, DiscoveryPayload, E360_SENSORS};
use crate::sink::{Availability, PublishSink};
use lge360_core::{MeterError, MeterResult};
use lge360_telegram::ReadingSet;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Upper bound for each step of [`Publisher::disconnect`]
pub const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Topic names under the configured base topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: String,
}

impl Topics {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn state(&self) -> String {
        format!("{}/state", self.base)
    }

    pub fn availability(&self) -> String {
        format!("{}/availability", self.base)
    }
}

/// Publishes the bridge's messages through a [`PublishSink`]
#[derive(Debug, Clone)]
pub struct Publisher<P> {
    sink: P,
    topics: Topics,
    device: DeviceInfo,
}

impl<P> Publisher<P>
where
    P: PublishSink,
{
    pub fn new(sink: P, topics: Topics) -> Self {
        Self {
            sink,
            topics,
            device: DeviceInfo::e360(),
        }
    }

    /// Publish one telegram's readings as a label → value JSON object
    ///
    /// Units are not repeated here; consumers learn them from discovery.
    pub async fn publish_readings(&self, readings: &ReadingSet) -> MeterResult<()> {
        let payload = to_json(&readings.values())?;
        self.sink.publish(&self.topics.state(), payload, false).await
    }

    pub async fn publish_availability(&self, availability: Availability) -> MeterResult<()> {
        self.sink
            .publish(
                &self.topics.availability(),
                availability.as_str().as_bytes().to_vec(),
                true,
            )
            .await
    }

    /// Publish the retained discovery config of every known sensor
    pub async fn publish_discovery(&self) -> MeterResult<()> {
        for sensor in E360_SENSORS {
            let payload = DiscoveryPayload::new(sensor, &self.topics, &self.device);
            self.sink
                .publish(&DiscoveryPayload::topic(sensor), to_json(&payload)?, true)
                .await?;
        }
        Ok(())
    }

    /// Announce the bridge after (re)connecting: discovery, then `online`
    pub async fn announce(&self) -> MeterResult<()> {
        self.publish_discovery().await?;
        self.publish_availability(Availability::Online).await
    }

    /// Publish `offline` and close the broker session
    ///
    /// Each step gives up after [`DISCONNECT_TIMEOUT`] with `MeterError::Timeout`.
    pub async fn disconnect(&self) -> MeterResult<()> {
        let offline = bounded(self.publish_availability(Availability::Offline)).await;
        bounded(self.sink.disconnect()).await?;
        offline
    }
}

async fn bounded<F>(step: F) -> MeterResult<()>
where
    F: Future<Output = MeterResult<()>>,
{
    tokio::time::timeout(DISCONNECT_TIMEOUT, step)
        .await
        .map_err(|_| MeterError::Timeout)?
}

fn to_json<T: Serialize>(value: &T) -> MeterResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| MeterError::Publish(format!("Failed to encode payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MockPublishSink;
    use async_trait::async_trait;
    use lge360_telegram::Reading;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_topics() {
        let topics = Topics::new("landisgyr_e360/");
        assert_eq!(topics.state(), "landisgyr_e360/state");
        assert_eq!(topics.availability(), "landisgyr_e360/availability");
    }

    #[tokio::test]
    async fn test_publish_readings() {
        let mut sink = MockPublishSink::new();
        sink.expect_publish()
            .withf(|topic, payload, retained| {
                let json: serde_json::Value = serde_json::from_slice(payload).unwrap();
                topic == "meter/state"
                    && !*retained
                    && json == serde_json::json!({
                        "total_active_energy_fwd": "001234.567",
                        "datetime": "230615120000",
                    })
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut readings = ReadingSet::new();
        readings.insert(Reading::new("total_active_energy_fwd", "001234.567", Some("kWh")));
        readings.insert(Reading::new("datetime", "230615120000", None));

        let publisher = Publisher::new(sink, Topics::new("meter"));
        publisher.publish_readings(&readings).await.unwrap();
    }

    #[tokio::test]
    async fn test_announce() {
        let mut seq = Sequence::new();
        let mut sink = MockPublishSink::new();
        sink.expect_publish()
            .withf(|topic, _, retained| topic.starts_with("homeassistant/sensor/") && *retained)
            .times(E360_SENSORS.len())
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        sink.expect_publish()
            .with(eq("meter/availability"), eq(b"online".to_vec()), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let publisher = Publisher::new(sink, Topics::new("meter"));
        publisher.announce().await.unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_after_failed_offline() {
        let mut sink = MockPublishSink::new();
        sink.expect_publish()
            .with(eq("meter/availability"), eq(b"offline".to_vec()), eq(true))
            .times(1)
            .returning(|_, _, _| Err(MeterError::Publish("not connected".to_string())));
        sink.expect_disconnect().times(1).returning(|| Ok(()));

        let publisher = Publisher::new(sink, Topics::new("meter"));
        assert!(matches!(publisher.disconnect().await, Err(MeterError::Publish(_))));
    }

    /// Sink whose broker never answers
    struct StalledSink;

    #[async_trait]
    impl PublishSink for StalledSink {
        async fn publish(&self, _topic: &str, _payload: Vec<u8>, _retained: bool) -> MeterResult<()> {
            std::future::pending().await
        }

        async fn disconnect(&self) -> MeterResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_disconnect_gives_up_on_stalled_sink() {
        let publisher = Publisher::new(StalledSink, Topics::new("meter"));
        let result = tokio::time::timeout(DISCONNECT_TIMEOUT * 3, publisher.disconnect()).await;
        assert!(matches!(result, Ok(Err(MeterError::Timeout))));
    }
}
