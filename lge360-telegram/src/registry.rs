//! OBIS code registry
//!
//! Labels follow the Danish branch standard for the external port of remotely
//! read electricity meters. They may work for other markets as well.

use lge360_core::ObisCode;
use std::collections::HashMap;

/// Semantic name and declared unit of a known OBIS code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: &'static str,
    unit: &'static str,
}

impl RegistryEntry {
    pub const fn new(name: &'static str, unit: &'static str) -> Self {
        Self { name, unit }
    }

    /// Declared unit, `None` when the entry leaves the unit to the telegram
    pub fn unit(&self) -> Option<&'static str> {
        if self.unit.is_empty() { None } else { Some(self.unit) }
    }
}

const fn code(a: u8, b: u8, c: u8, d: u8, e: u8) -> ObisCode {
    ObisCode::new(a, b, c, d, e, 255)
}

/// Data points the E360 reports on its customer port
const E360_ENTRIES: &[(ObisCode, RegistryEntry)] = &[
    (code(0, 0, 1, 0, 0), RegistryEntry::new("datetime", "")),
    (code(1, 0, 1, 8, 0), RegistryEntry::new("total_active_energy_fwd", "kWh")),
    (code(1, 0, 2, 8, 0), RegistryEntry::new("total_active_energy_rev", "kWh")),
    (code(1, 0, 3, 8, 0), RegistryEntry::new("reactive_energy_fwd", "kVArh")),
    (code(1, 0, 4, 8, 0), RegistryEntry::new("rective_energy_rev", "kVArh")),
    (code(1, 0, 1, 7, 0), RegistryEntry::new("active_power_fwd", "kW")),
    (code(1, 0, 2, 7, 0), RegistryEntry::new("active_power_rev", "kW")),
    (code(1, 0, 3, 7, 0), RegistryEntry::new("reactive_power_fwd", "kVAr")),
    (code(1, 0, 4, 7, 0), RegistryEntry::new("reactive_power_rev", "kVAr")),
    (code(1, 0, 21, 7, 0), RegistryEntry::new("active_power_l1_fwd", "kW")),
    (code(1, 0, 22, 7, 0), RegistryEntry::new("active_power_l1_rev", "kW")),
    (code(1, 0, 41, 7, 0), RegistryEntry::new("active_power_l2_fwd", "kW")),
    (code(1, 0, 42, 7, 0), RegistryEntry::new("active_power_l2_rev", "kW")),
    (code(1, 0, 61, 7, 0), RegistryEntry::new("active_power_l3_fwd", "kW")),
    (code(1, 0, 62, 7, 0), RegistryEntry::new("active_power_l3_rev", "kW")),
    (code(1, 0, 23, 7, 0), RegistryEntry::new("reactive_power_l1_imp", "kVAr")),
    (code(1, 0, 24, 7, 0), RegistryEntry::new("reactive_power_l1_exp", "kVAr")),
    (code(1, 0, 43, 7, 0), RegistryEntry::new("reactive_power_l2_imp", "kVAr")),
    (code(1, 0, 44, 7, 0), RegistryEntry::new("reactive_power_l2_exp", "kVAr")),
    (code(1, 0, 63, 7, 0), RegistryEntry::new("reactive_power_l3_imp", "kVAr")),
    (code(1, 0, 64, 7, 0), RegistryEntry::new("reactive_power_l3_exp", "kVAr")),
    (code(1, 0, 32, 7, 0), RegistryEntry::new("voltage_rms_l1", "V")),
    (code(1, 0, 52, 7, 0), RegistryEntry::new("voltage_rms_l2", "V")),
    (code(1, 0, 72, 7, 0), RegistryEntry::new("voltage_rms_l3", "V")),
    (code(1, 0, 31, 7, 0), RegistryEntry::new("current_rms_l1", "A")),
    (code(1, 0, 51, 7, 0), RegistryEntry::new("current_rms_l2", "A")),
    (code(1, 0, 71, 7, 0), RegistryEntry::new("current_rms_l3", "A")),
];

/// Read-only mapping from OBIS code to semantic name and unit
///
/// Built once at startup and shared (behind an `Arc`) by the mapper and the
/// unhandled-code reporter.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<ObisCode, RegistryEntry>,
}

impl Registry {
    /// Registry for the Landis+Gyr E360
    pub fn e360() -> Self {
        Self {
            entries: E360_ENTRIES.iter().copied().collect(),
        }
    }

    /// Look up a code as printed in a telegram
    ///
    /// Only the canonical reduced notation matches: `01-0:1.8.0` or
    /// `1-0:1.8.0*255` are different text and are not found, and neither is
    /// text that is not an OBIS code at all.
    pub fn get(&self, text: &str) -> Option<&RegistryEntry> {
        let code = ObisCode::from_string(text).ok()?;
        if code.to_string() != text {
            return None;
        }
        self.entries.get(&code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }
}
