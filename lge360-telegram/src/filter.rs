//! Zero-value suppression

use crate::reading::{Reading, ReadingSet};

/// Label substring marking an alternate field that is kept even at zero
pub const ALTERNATE_MARKER: &str = "alt";

/// Drops readings whose value is exactly zero, unless the label carries the
/// alternate marker
///
/// Values that are not numbers (timestamps, identifiers) are always kept.
#[derive(Debug, Clone)]
pub struct ZeroValueFilter {
    keep_marker: String,
}

impl Default for ZeroValueFilter {
    fn default() -> Self {
        Self::new(ALTERNATE_MARKER)
    }
}

impl ZeroValueFilter {
    pub fn new(keep_marker: impl Into<String>) -> Self {
        Self {
            keep_marker: keep_marker.into(),
        }
    }

    pub fn keep(&self, reading: &Reading) -> bool {
        match reading.numeric_value() {
            Some(value) if value == 0.0 => reading.label.contains(&self.keep_marker),
            _ => true,
        }
    }

    /// Collect the surviving readings into a set
    pub fn apply<I>(&self, readings: I) -> ReadingSet
    where
        I: IntoIterator<Item = Reading>,
    {
        readings.into_iter().filter(|r| self.keep(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dropped() {
        let filter = ZeroValueFilter::default();
        assert!(!filter.keep(&Reading::new("active_power_rev", "00.000", Some("kW"))));
        assert!(!filter.keep(&Reading::new("1-0:99.9.9", "0", None)));
    }

    #[test]
    fn test_zero_kept_for_alternate_label() {
        let filter = ZeroValueFilter::default();
        assert!(filter.keep(&Reading::new("voltage_alt_l1", "0", Some("V"))));
    }

    #[test]
    fn test_non_zero_and_non_numeric_kept() {
        let filter = ZeroValueFilter::default();
        assert!(filter.keep(&Reading::new("active_power_fwd", "00.001", Some("kW"))));
        assert!(filter.keep(&Reading::new("datetime", "000000000000", None)));
        assert!(filter.keep(&Reading::new("meter_id", "LGZ0", None)));
    }

    #[test]
    fn test_apply() {
        let set = ZeroValueFilter::new("keep").apply([
            Reading::new("a", "0", None),
            Reading::new("a_keep", "0.0", None),
            Reading::new("b", "1.5", None),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.get("a").is_none());
        assert!(set.get("a_keep").is_some());
    }
}
