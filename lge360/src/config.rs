//! Command line configuration

use clap::{Parser, ValueEnum};
use lge360_core::{MeterError, MeterResult};
use lge360_mqtt::MqttConfig;
use lge360_transport::SerialSettings;
use std::time::Duration;

/// Serial parity accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParityArg {
    #[value(name = "N")]
    None,
    #[value(name = "E")]
    Even,
    #[value(name = "O")]
    Odd,
}

impl From<ParityArg> for tokio_serial::Parity {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => tokio_serial::Parity::None,
            ParityArg::Even => tokio_serial::Parity::Even,
            ParityArg::Odd => tokio_serial::Parity::Odd,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "lge360")]
#[command(version)]
#[command(
    about = "Read from Landis+Gyr E360 and publish to MQTT",
    long_about = None,
    after_help = "Examples:\n  lge360 --mqtt-broker 192.168.1.10\n  lge360 --serial-port /dev/ttyAMA0 --mqtt-broker broker.local --mqtt-topic meter"
)]
pub struct Config {
    /// Serial port for the meter
    #[arg(long, alias = "serial_port", default_value = "/dev/ttyUSB0")]
    pub serial_port: String,

    /// Baud rate for serial communication
    #[arg(long, default_value_t = 115200)]
    pub baudrate: u32,

    /// Byte size for serial communication
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(5..=8))]
    pub bytesize: u8,

    /// Parity for serial communication
    #[arg(long, value_enum, default_value = "N")]
    pub parity: ParityArg,

    /// Stop bits for serial communication
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub stopbits: u8,

    /// Serial read timeout in milliseconds; bounds the wait for a telegram's end
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Interval between read attempts in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// MQTT broker address
    #[arg(long, alias = "mqtt_broker")]
    pub mqtt_broker: String,

    /// MQTT broker port
    #[arg(long, alias = "mqtt_port", default_value_t = 1883)]
    pub mqtt_port: u16,

    /// MQTT base topic
    #[arg(long, alias = "mqtt_topic", default_value = "landisgyr_e360")]
    pub mqtt_topic: String,

    /// MQTT user name (used together with --mqtt-password)
    #[arg(long, requires = "mqtt_password")]
    pub mqtt_username: Option<String>,

    /// MQTT password
    #[arg(long, requires = "mqtt_username")]
    pub mqtt_password: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Serial port settings for the meter
    ///
    /// # Errors
    /// Returns `MeterError::Config` for a byte size or stop bit count the
    /// driver does not support.
    pub fn serial_settings(&self) -> MeterResult<SerialSettings> {
        let data_bits = match self.bytesize {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            8 => tokio_serial::DataBits::Eight,
            other => return Err(MeterError::Config(format!("Unsupported byte size: {}", other))),
        };
        let stop_bits = match self.stopbits {
            1 => tokio_serial::StopBits::One,
            2 => tokio_serial::StopBits::Two,
            other => return Err(MeterError::Config(format!("Unsupported stop bits: {}", other))),
        };

        let mut settings = SerialSettings::with_timeout(
            self.serial_port.clone(),
            self.baudrate,
            Duration::from_millis(self.timeout_ms),
        );
        settings.data_bits = data_bits;
        settings.stop_bits = stop_bits;
        settings.parity = self.parity.into();
        Ok(settings)
    }

    pub fn mqtt_config(&self) -> MqttConfig {
        let mut config = MqttConfig::new(self.mqtt_broker.clone(), self.mqtt_port, self.mqtt_topic.clone());
        config.username = self.mqtt_username.clone();
        config.password = self.mqtt_password.clone();
        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
