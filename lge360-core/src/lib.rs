//! Core types and utilities for the E360 meter bridge
//!
//! This crate provides fundamental types and error handling
//! used throughout the meter reading and publishing pipeline.

pub mod error;
pub mod obis_code;

pub use error::{MeterError, MeterResult};
pub use obis_code::ObisCode;
