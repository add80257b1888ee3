//! Decoded readings

use serde::Serialize;
use std::collections::BTreeMap;

/// One labeled measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub label: String,
    pub value: String,
    pub unit: Option<String>,
}

impl Reading {
    pub fn new(label: impl Into<String>, value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: unit.map(str::to_string),
        }
    }

    /// The value as a number, `None` for values such as timestamps or identifiers
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse::<f64>().ok()
    }
}

/// The readings of one telegram, keyed by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadingSet {
    readings: BTreeMap<String, Reading>,
}

impl ReadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading; a later reading with the same label replaces the earlier one
    pub fn insert(&mut self, reading: Reading) {
        self.readings.insert(reading.label.clone(), reading);
    }

    pub fn get(&self, label: &str) -> Option<&Reading> {
        self.readings.get(label)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Plain label → value mapping, the per-cycle payload for the publisher
    pub fn values(&self) -> BTreeMap<&str, &str> {
        self.readings
            .iter()
            .map(|(label, reading)| (label.as_str(), reading.value.as_str()))
            .collect()
    }
}

impl FromIterator<Reading> for ReadingSet {
    fn from_iter<T: IntoIterator<Item = Reading>>(iter: T) -> Self {
        let mut set = Self::new();
        for reading in iter {
            set.insert(reading);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_writer_wins() {
        let set: ReadingSet = [
            Reading::new("voltage_rms_l1", "229.9", Some("V")),
            Reading::new("voltage_rms_l1", "230.4", Some("V")),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("voltage_rms_l1").unwrap().value, "230.4");
    }

    #[test]
    fn test_values() {
        let mut set = ReadingSet::new();
        set.insert(Reading::new("active_power_fwd", "01.193", Some("kW")));
        set.insert(Reading::new("datetime", "230615120000", Some("W")));

        let values = set.values();
        assert_eq!(values.get("active_power_fwd"), Some(&"01.193"));
        assert_eq!(values.get("datetime"), Some(&"230615120000"));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(Reading::new("a", "001234.567", None).numeric_value(), Some(1234.567));
        assert_eq!(Reading::new("a", "ABC", None).numeric_value(), None);
    }
}
