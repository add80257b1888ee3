//! Transport layer for the E360 meter bridge
//!
//! This crate provides the line-oriented stream interface the telegram
//! framer reads from, and the serial port implementation of it.

pub mod serial;
pub mod stream;

pub use lge360_core::{MeterError, MeterResult};
pub use serial::{SerialSettings, SerialTransport};
pub use stream::{StreamAccessor, StreamReader, TransportLayer};
