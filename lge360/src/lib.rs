//! Landis+Gyr E360 to MQTT bridge
//!
//! # Architecture
//!
//! - `lge360-core`: error handling and the OBIS code type
//! - `lge360-transport`: serial and in-memory byte streams
//! - `lge360-telegram`: telegram framing, OBIS decoding, labeling and filtering
//! - `lge360-mqtt`: state, availability and discovery publishing
//! - `lge360` (this crate): configuration and the polling loop

pub mod app;
pub mod config;

pub use app::App;
pub use config::Config;

pub use lge360_core::{MeterError, MeterResult, ObisCode};

pub mod telegram {
    pub use lge360_telegram::*;
}

pub mod mqtt {
    pub use lge360_mqtt::*;
}

pub mod transport {
    pub use lge360_transport::*;
}
