//! Publish side of the E360 meter bridge
//!
//! Readings go to `{base}/state` as one JSON object per telegram, the bridge's
//! liveness to `{base}/availability`, and Home Assistant discovery configs to
//! `homeassistant/sensor/...` every time the broker session comes up.

pub mod discovery;
pub mod mqtt;
pub mod publisher;
pub mod sink;

pub use discovery::{DeviceInfo, DiscoveryPayload, SensorDescriptor, E360_SENSORS};
pub use mqtt::{MqttConfig, MqttSink};
pub use publisher::{Publisher, Topics, DISCONNECT_TIMEOUT};
pub use sink::{Availability, PublishSink};
