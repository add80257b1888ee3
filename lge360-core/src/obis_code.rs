use crate::error::{MeterError, MeterResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reduced IEC 62056-21 notation, `A-B:C.D.E` with an optional `*F`
static REDUCED_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)-(\d+):(\d+)\.(\d+)\.(\d+)(?:\*(\d+))?$").expect("valid OBIS pattern")
});

/// Value group F used when a code is written without one
pub const DEFAULT_F: u8 = 255;

/// OBIS (Object Identification System) code
///
/// OBIS codes are 6-byte identifiers for metering data points. Meters
/// speaking the line protocol print them in the reduced form `1-0:1.8.0`,
/// leaving out the F group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    /// Create a new OBIS code from individual value groups
    ///
    /// # Arguments
    ///
    /// * `a` - Medium (A value)
    /// * `b` - Channel (B value)
    /// * `c` - Physical quantity (C value)
    /// * `d` - Processing (D value)
    /// * `e` - Tariff / classification (E value)
    /// * `f` - Historical value (F value)
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Parse an OBIS code from string format
    ///
    /// Supports formats like:
    /// - "1.0.1.8.0.255"
    /// - "1-0:1.8.0"
    /// - "1-0:1.8.0*2"
    ///
    /// # Returns
    ///
    /// Returns `Ok(ObisCode)` if parsing succeeds, `Err(MeterError::InvalidData)` otherwise
    pub fn from_string(s: &str) -> MeterResult<Self> {
        if let Ok(code) = Self::parse_reduced_format(s) {
            return Ok(code);
        }

        if let Ok(code) = Self::parse_dot_format(s) {
            return Ok(code);
        }

        Err(MeterError::InvalidData(format!("Invalid OBIS code format: {}", s)))
    }

    fn parse_dot_format(s: &str) -> MeterResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(MeterError::InvalidData("Expected 6 dot-separated values".to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = Self::parse_group(part)?;
        }

        Ok(Self { bytes })
    }

    fn parse_reduced_format(s: &str) -> MeterResult<Self> {
        let caps = REDUCED_FORMAT
            .captures(s)
            .ok_or_else(|| MeterError::InvalidData(format!("Not a reduced OBIS code: {}", s)))?;

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().take(5).enumerate() {
            *byte = Self::parse_group(&caps[i + 1])?;
        }
        bytes[5] = match caps.get(6) {
            Some(f) => Self::parse_group(f.as_str())?,
            None => DEFAULT_F,
        };

        Ok(Self { bytes })
    }

    fn parse_group(part: &str) -> MeterResult<u8> {
        part.parse::<u8>()
            .map_err(|_| MeterError::InvalidData(format!("Invalid value group: {}", part)))
    }
}

impl FromStr for ObisCode {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Reduced notation as printed by the meter; F is shown only when it is not 255
impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(f, "{}-{}:{}.{}.{}", b[0], b[1], b[2], b[3], b[4])?;
        if b[5] != DEFAULT_F {
            write!(f, "*{}", b[5])?;
        }
        Ok(())
    }
}
