//! Semantic mapping from OBIS codes to labels

use crate::parser::RawRecord;
use crate::reading::Reading;
use crate::registry::Registry;
use std::sync::Arc;

/// Turns raw records into labeled readings using the [`Registry`]
///
/// Unknown codes are expected: they keep their code as label and the unit
/// the telegram carried.
#[derive(Debug, Clone)]
pub struct SemanticMapper {
    registry: Arc<Registry>,
}

impl SemanticMapper {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn map(&self, record: &RawRecord) -> Reading {
        match self.registry.get(&record.code) {
            Some(entry) => Reading {
                label: entry.name.to_string(),
                value: record.value.clone(),
                unit: entry
                    .unit()
                    .map(str::to_string)
                    .or_else(|| record.unit.clone()),
            },
            None => Reading {
                label: record.code.clone(),
                value: record.value.clone(),
                unit: record.unit.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> SemanticMapper {
        SemanticMapper::new(Arc::new(Registry::e360()))
    }

    #[test]
    fn test_map_known_code_uses_registry_unit() {
        let reading = mapper().map(&RawRecord::new("1-0:3.8.0", "000012.000", Some("kvarh")));
        assert_eq!(reading, Reading::new("reactive_energy_fwd", "000012.000", Some("kVArh")));
    }

    #[test]
    fn test_map_known_code_without_declared_unit() {
        let reading = mapper().map(&RawRecord::new("0-0:1.0.0", "230615120000", Some("W")));
        assert_eq!(reading, Reading::new("datetime", "230615120000", Some("W")));
    }

    #[test]
    fn test_map_unknown_code_passes_through() {
        let reading = mapper().map(&RawRecord::new("1-0:99.9.9", "0", None));
        assert_eq!(reading, Reading::new("1-0:99.9.9", "0", None));

        let reading = mapper().map(&RawRecord::new("1-0:14.7.0", "50.00", Some("Hz")));
        assert_eq!(reading, Reading::new("1-0:14.7.0", "50.00", Some("Hz")));
    }

    #[test]
    fn test_map_code_outside_byte_range() {
        let reading = mapper().map(&RawRecord::new("1-0:512.7.0", "1", None));
        assert_eq!(reading.label, "1-0:512.7.0");
    }
}
