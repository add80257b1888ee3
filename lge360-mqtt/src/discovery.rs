//! Home Assistant MQTT discovery

use crate::publisher::Topics;
use serde::Serialize;

/// Discovery topic prefix for the meter's sensors
pub const DISCOVERY_PREFIX: &str = "homeassistant/sensor/landisgyr_e360";

/// Presentation of one reading in Home Assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: &'static str,
    /// Reading label, as produced by the registry
    pub unique_id: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
    pub state_class: &'static str,
    pub device_class: &'static str,
}

const fn energy(name: &'static str, unique_id: &'static str, unit: &'static str) -> SensorDescriptor {
    SensorDescriptor {
        name,
        unique_id,
        unit,
        icon: "mdi:flash",
        state_class: "total_increasing",
        device_class: "energy",
    }
}

const fn measurement(
    name: &'static str,
    unique_id: &'static str,
    unit: &'static str,
    device_class: &'static str,
) -> SensorDescriptor {
    SensorDescriptor {
        name,
        unique_id,
        unit,
        icon: "mdi:flash",
        state_class: "measurement",
        device_class,
    }
}

/// Sensors announced for the E360
pub const E360_SENSORS: &[SensorDescriptor] = &[
    energy("Total Active Energy Import", "total_active_energy_fwd", "kWh"),
    energy("Total Active Energy Export", "total_active_energy_rev", "kWh"),
    energy("Total Reactive Energy Import", "reactive_energy_fwd", "varh"),
    energy("Total Reactive Energy Export", "rective_energy_rev", "varh"),
    measurement("Active Power Import", "active_power_fwd", "kW", "power"),
    measurement("Active Power Export", "active_power_rev", "kW", "power"),
    measurement("Active Power L1", "active_power_l1_fwd", "kW", "power"),
    measurement("Active Power L2", "active_power_l2_fwd", "kW", "power"),
    measurement("Active Power L3", "active_power_l3_fwd", "kW", "power"),
    measurement("Reactive Power L1", "reactive_power_l1_imp", "var", "power"),
    measurement("Reactive Power L2", "reactive_power_l2_imp", "var", "power"),
    measurement("Reactive Power L3", "reactive_power_l3_imp", "var", "power"),
    measurement("Voltage L1", "voltage_rms_l1", "V", "voltage"),
    measurement("Voltage L2", "voltage_rms_l2", "V", "voltage"),
    measurement("Voltage L3", "voltage_rms_l3", "V", "voltage"),
    measurement("Current L1", "current_rms_l1", "A", "current"),
    measurement("Current L2", "current_rms_l2", "A", "current"),
    measurement("Current L3", "current_rms_l3", "A", "current"),
];

/// Device block shared by every sensor config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

impl DeviceInfo {
    pub fn e360() -> Self {
        Self {
            identifiers: vec!["landisgyr_e360_meter".to_string()],
            name: "Landis+Gyr E360".to_string(),
            model: "E360".to_string(),
            manufacturer: "Landis+Gyr".to_string(),
        }
    }

    fn device_id(&self) -> &str {
        self.identifiers.first().map(String::as_str).unwrap_or_default()
    }
}

/// Retained config message for one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryPayload {
    pub name: String,
    pub state_topic: String,
    pub unique_id: String,
    pub unit_of_measurement: String,
    pub availability_topic: String,
    pub device: DeviceInfo,
    pub icon: String,
    pub value_template: String,
    pub state_class: String,
    pub device_class: String,
}

impl DiscoveryPayload {
    pub fn new(sensor: &SensorDescriptor, topics: &Topics, device: &DeviceInfo) -> Self {
        Self {
            name: sensor.name.to_string(),
            state_topic: topics.state(),
            unique_id: format!("{}_{}", device.device_id(), sensor.unique_id),
            unit_of_measurement: sensor.unit.to_string(),
            availability_topic: topics.availability(),
            device: device.clone(),
            icon: sensor.icon.to_string(),
            value_template: format!("{{{{ value_json.{} }}}}", sensor.unique_id),
            state_class: sensor.state_class.to_string(),
            device_class: sensor.device_class.to_string(),
        }
    }

    /// Topic the config is published on
    pub fn topic(sensor: &SensorDescriptor) -> String {
        format!("{}/{}/config", DISCOVERY_PREFIX, sensor.unique_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_payload() {
        let topics = Topics::new("landisgyr_e360");
        let payload = DiscoveryPayload::new(&E360_SENSORS[12], &topics, &DeviceInfo::e360());

        assert_eq!(payload.unique_id, "landisgyr_e360_meter_voltage_rms_l1");
        assert_eq!(payload.state_topic, "landisgyr_e360/state");
        assert_eq!(payload.availability_topic, "landisgyr_e360/availability");
        assert_eq!(payload.value_template, "{{ value_json.voltage_rms_l1 }}");
        assert_eq!(payload.device_class, "voltage");
        assert_eq!(
            DiscoveryPayload::topic(&E360_SENSORS[12]),
            "homeassistant/sensor/landisgyr_e360/voltage_rms_l1/config"
        );
    }

    #[test]
    fn test_discovery_payload_json() {
        let topics = Topics::new("meter");
        let payload = DiscoveryPayload::new(&E360_SENSORS[0], &topics, &DeviceInfo::e360());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["state_class"], "total_increasing");
        assert_eq!(json["unit_of_measurement"], "kWh");
        assert_eq!(json["device"]["manufacturer"], "Landis+Gyr");
        assert_eq!(json["device"]["identifiers"][0], "landisgyr_e360_meter");
    }

    #[test]
    fn test_sensor_ids_are_unique() {
        let mut ids: Vec<_> = E360_SENSORS.iter().map(|s| s.unique_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), E360_SENSORS.len());
    }
}
