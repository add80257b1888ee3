//! Polling loop between the meter reader and the publisher

use lge360_core::MeterResult;
use lge360_mqtt::{PublishSink, Publisher};
use lge360_telegram::MeterReader;
use lge360_transport::StreamAccessor;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// The running bridge: one reader, one publisher, one read attempt per tick
pub struct App<S, P> {
    reader: MeterReader<S>,
    publisher: Publisher<P>,
    poll_interval: Duration,
}

impl<S, P> App<S, P>
where
    S: StreamAccessor,
    P: PublishSink,
{
    pub fn new(reader: MeterReader<S>, publisher: Publisher<P>, poll_interval: Duration) -> Self {
        Self {
            reader,
            publisher,
            poll_interval,
        }
    }

    pub fn reader(&self) -> &MeterReader<S> {
        &self.reader
    }

    /// Poll the meter until `shutdown` resolves or a transport error occurs
    ///
    /// A failed publish is logged and the loop keeps reading.
    ///
    /// `shutdown` is checked before every tick and also while a cycle is
    /// waiting for a telegram's terminator, so an interrupt is never held up
    /// by the serial timeout. Resources are not released here; call
    /// [`App::shutdown`] afterwards in either case.
    pub async fn run<F>(&mut self, shutdown: F) -> MeterResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.cycle() => result,
            };
            match outcome {
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => log::warn!(target: "lge360::app", "Failed to publish readings: {}", e),
                Ok(()) => {}
            }
        }

        log::info!(target: "lge360::app", "Disconnected by user");
        Ok(())
    }

    async fn cycle(&mut self) -> MeterResult<()> {
        if let Some(readings) = self.reader.read().await? {
            if !readings.is_empty() {
                self.publisher.publish_readings(&readings).await?;
            }
        }
        Ok(())
    }

    /// Close the meter stream and tell consumers the bridge is offline
    ///
    /// Both steps are attempted even if the first fails; the first error is returned.
    pub async fn shutdown(&mut self) -> MeterResult<()> {
        let stats = self.reader.statistics();
        log::info!(
            target: "lge360::app",
            "Received {} telegrams ({:.1}% incomplete), discarded {} lines",
            stats.telegrams_received,
            stats.incomplete_rate(),
            stats.lines_discarded
        );
        let closed = self.reader.close().await;
        if let Err(e) = &closed {
            log::warn!(target: "lge360::app", "Failed to close meter stream: {}", e);
        }
        let disconnected = self.publisher.disconnect().await;
        if let Err(e) = &disconnected {
            log::warn!(target: "lge360::app", "Failed to disconnect publisher: {}", e);
        }
        closed.and(disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lge360_core::MeterError;
    use lge360_mqtt::Topics;
    use lge360_telegram::Registry;
    use lge360_transport::StreamReader;
    use mockall::mock;
    use mockall::predicate::eq;
    use std::sync::Arc;
    use tokio::io::AsyncWriteExt;

    mock! {
        Sink {}

        #[async_trait]
        impl PublishSink for Sink {
            async fn publish(&self, topic: &str, payload: Vec<u8>, retained: bool) -> MeterResult<()>;
            async fn disconnect(&self) -> MeterResult<()>;
        }
    }

    fn expect_shutdown(sink: &mut MockSink) {
        sink.expect_publish()
            .with(eq("meter/availability"), eq(b"offline".to_vec()), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));
        sink.expect_disconnect().times(1).returning(|| Ok(()));
    }

    fn app<S: StreamAccessor>(stream: S, sink: MockSink) -> App<S, MockSink> {
        App::new(
            MeterReader::new(stream, Arc::new(Registry::e360())),
            Publisher::new(sink, Topics::new("meter")),
            Duration::from_millis(5),
        )
    }

    #[tokio::test]
    async fn test_run_publishes_filtered_readings() {
        let input: &'static [u8] = b"/LGF5E360\r\n\r\n1-0:1.8.0(001234.567*kWh)\r\n1-0:99.9.9(0)\r\n!";
        let mut sink = MockSink::new();
        sink.expect_publish()
            .withf(|topic, payload, retained| {
                let json: serde_json::Value = serde_json::from_slice(payload).unwrap();
                topic == "meter/state"
                    && !*retained
                    && json == serde_json::json!({ "total_active_energy_fwd": "001234.567" })
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_shutdown(&mut sink);

        let mut app = app(StreamReader::new(input, Some(Duration::from_secs(1))), sink);
        app.run(tokio::time::sleep(Duration::from_millis(100))).await.unwrap();
        assert_eq!(app.reader().statistics().telegrams_received, 1);
        app.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_skips_empty_reading_set() {
        let input: &'static [u8] = b"/LGF5E360\r\n\r\n1-0:2.7.0(00.000*kW)\r\n!";
        let mut sink = MockSink::new();
        expect_shutdown(&mut sink);

        let mut app = app(StreamReader::new(input, Some(Duration::from_secs(1))), sink);
        app.run(tokio::time::sleep(Duration::from_millis(50))).await.unwrap();
        app.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_continues_after_publish_error() {
        let (mut writer, stream) = tokio::io::duplex(256);
        let telegram: &[u8] = b"/LGF5E360\r\n\r\n1-0:1.8.0(001234.567*kWh)\r\n!";
        writer.write_all(telegram).await.unwrap();
        let mut sink = MockSink::new();
        let mut attempts = 0;
        sink.expect_publish()
            .withf(|topic, _, _| topic == "meter/state")
            .times(2)
            .returning(move |_, _, _| {
                attempts += 1;
                if attempts == 1 {
                    Err(MeterError::Publish("broker unreachable".to_string()))
                } else {
                    Ok(())
                }
            });
        expect_shutdown(&mut sink);

        let mut app = app(StreamReader::new(stream, Some(Duration::from_millis(50))), sink);
        let feeder = async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            writer.write_all(telegram).await.unwrap();
            tokio::time::sleep(Duration::from_millis(60)).await;
        };
        app.run(feeder).await.unwrap();
        assert_eq!(app.reader().statistics().telegrams_received, 2);
        app.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_on_transport_error() {
        let mock = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
            .build();
        let mut sink = MockSink::new();
        expect_shutdown(&mut sink);

        let mut app = app(StreamReader::new(mock, Some(Duration::from_secs(1))), sink);
        let result = app.run(std::future::pending()).await;
        assert!(matches!(result, Err(MeterError::Connection(_))));
        app.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_terminator() {
        let (mut writer, stream) = tokio::io::duplex(64);
        writer.write_all(b"/LGF5E360\r\n1-0:1.8.0(").await.unwrap();
        let mut sink = MockSink::new();
        expect_shutdown(&mut sink);

        let mut app = app(StreamReader::new(stream, None), sink);
        app.run(tokio::time::sleep(Duration::from_millis(50))).await.unwrap();
        assert_eq!(app.reader().statistics().telegrams_received, 0);
        app.shutdown().await.unwrap();
    }
}
