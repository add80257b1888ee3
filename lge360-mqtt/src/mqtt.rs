//! MQTT sink backed by rumqttc

use crate::publisher::{Publisher, Topics};
use crate::sink::{Availability, PublishSink};
use async_trait::async_trait;
use lge360_core::{MeterError, MeterResult};
use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Outgoing, Packet, QoS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Capacity of the client's request queue
const REQUEST_CAPACITY: usize = 32;

/// Broker connection settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive: Duration,
    /// Base topic for state and availability
    pub base_topic: String,
}

impl MqttConfig {
    pub fn new(host: impl Into<String>, port: u16, base_topic: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: format!("lge360-{}", std::process::id()),
            username: None,
            password: None,
            keep_alive: Duration::from_secs(60),
            base_topic: base_topic.into(),
        }
    }

    fn options(&self, topics: &Topics) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username.clone(), password.clone());
        }
        options.set_last_will(LastWill::new(
            topics.availability(),
            Availability::Offline.as_str(),
            QoS::AtLeastOnce,
            true,
        ));
        options
    }
}

/// [`PublishSink`] over an rumqttc client
///
/// Retained messages (availability, discovery) go out with QoS 1, state
/// updates with QoS 0. A state update is dropped, not queued, while the
/// client's request queue is full.
#[derive(Clone)]
pub struct MqttSink {
    client: AsyncClient,
    stopping: Arc<AtomicBool>,
}

impl MqttSink {
    /// Create the client and spawn its event loop
    ///
    /// Every connection acknowledgement from the broker, including after a
    /// reconnect, triggers [`Publisher::announce`].
    ///
    /// # Returns
    /// The publisher and the event loop task; the task ends after
    /// [`PublishSink::disconnect`].
    pub fn connect(config: &MqttConfig) -> (Publisher<MqttSink>, JoinHandle<()>) {
        let topics = Topics::new(config.base_topic.clone());
        let (client, mut eventloop) = AsyncClient::new(config.options(&topics), REQUEST_CAPACITY);
        let sink = MqttSink {
            client,
            stopping: Arc::new(AtomicBool::new(false)),
        };
        let publisher = Publisher::new(sink.clone(), topics);

        let announcer = publisher.clone();
        let endpoint = format!("{}:{}", config.host, config.port);
        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        log::info!(target: "lge360::mqtt", "Connected to {} with result code {:?}", endpoint, ack.code);
                        // The event loop has to keep polling while these publishes queue up.
                        let announcer = announcer.clone();
                        tokio::spawn(async move {
                            if let Err(e) = announcer.announce().await {
                                log::warn!(target: "lge360::mqtt", "Failed to announce: {}", e);
                            }
                        });
                    }
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        log::info!(target: "lge360::mqtt", "Disconnected from {}", endpoint);
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        if sink.stopping.load(Ordering::SeqCst) {
                            break;
                        }
                        log::warn!(target: "lge360::mqtt", "MQTT event loop error: {}", err);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        (publisher, handle)
    }
}

#[async_trait]
impl PublishSink for MqttSink {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retained: bool) -> MeterResult<()> {
        if retained {
            return self
                .client
                .publish(topic, QoS::AtLeastOnce, true, payload)
                .await
                .map_err(|e| MeterError::Publish(format!("Failed to publish to {}: {}", topic, e)));
        }
        // State updates never wait for the request queue.
        if let Err(e) = self.client.try_publish(topic, QoS::AtMostOnce, false, payload) {
            log::warn!(target: "lge360::mqtt", "Dropped update for {}: {}", topic, e);
        }
        Ok(())
    }

    async fn disconnect(&self) -> MeterResult<()> {
        self.stopping.store(true, Ordering::SeqCst);
        self.client
            .disconnect()
            .await
            .map_err(|e| MeterError::Publish(format!("Failed to disconnect: {}", e)))
    }
}

impl std::fmt::Debug for MqttSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSink")
            .field("stopping", &self.stopping.load(Ordering::SeqCst))
            .finish()
    }
}
