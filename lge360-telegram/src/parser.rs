//! OBIS data record parser

use crate::framer::Telegram;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `<code>(<value>[*<unit>])`
///
/// The value is either a decimal (digits and dots) or a single word; the unit
/// is an optional word after `*`.
static OBIS_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+-\d+:\d+\.\d+\.\d+)\(([\d.]+|\w+)\*?(\w+)?\)").expect("valid record pattern")
});

/// One data record as it appears in the telegram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub code: String,
    pub value: String,
    pub unit: Option<String>,
}

impl RawRecord {
    pub fn new(code: impl Into<String>, value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
            unit: unit.map(str::to_string),
        }
    }
}

/// Extracts data records from a telegram body
#[derive(Debug, Default, Clone, Copy)]
pub struct ObisRecordParser;

impl ObisRecordParser {
    /// Parse every record in the telegram, left to right
    ///
    /// Text that does not match the record grammar is skipped, so a truncated
    /// or garbled telegram simply yields fewer records.
    pub fn parse(telegram: &Telegram) -> Vec<RawRecord> {
        Self::parse_body(telegram.body())
    }

    pub fn parse_body(body: &str) -> Vec<RawRecord> {
        OBIS_RECORD
            .captures_iter(body)
            .map(|caps| RawRecord {
                code: caps[1].to_string(),
                value: caps[2].to_string(),
                unit: caps.get(3).map(|m| m.as_str().to_string()),
            })
            .collect()
    }

    /// Codes of every record in the body, in order of appearance
    pub fn codes(body: &str) -> impl Iterator<Item = &str> {
        OBIS_RECORD
            .captures_iter(body)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0-0:1.0.0(230615120000W)\r\n\
        1-0:1.8.0(001234.567*kWh)\r\n\
        1-0:32.7.0(230.1*V)\r\n\
        1-0:99.9.9(0)\r\n\
        !";

    #[test]
    fn test_parse_records_in_order() {
        let records = ObisRecordParser::parse_body(SAMPLE);
        assert_eq!(
            records,
            vec![
                RawRecord::new("0-0:1.0.0", "230615120000", Some("W")),
                RawRecord::new("1-0:1.8.0", "001234.567", Some("kWh")),
                RawRecord::new("1-0:32.7.0", "230.1", Some("V")),
                RawRecord::new("1-0:99.9.9", "0", None),
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let telegram = Telegram::new(SAMPLE);
        assert_eq!(
            ObisRecordParser::parse(&telegram),
            ObisRecordParser::parse(&telegram)
        );
    }

    #[test]
    fn test_parse_word_value() {
        let records = ObisRecordParser::parse_body("0-0:96.1.0(ABC123)");
        assert_eq!(records, vec![RawRecord::new("0-0:96.1.0", "ABC123", None)]);
    }

    #[test]
    fn test_parse_records_on_one_line() {
        let records = ObisRecordParser::parse_body("1-0:1.7.0(01.5*kW)1-0:2.7.0(00.0*kW)");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code, "1-0:2.7.0");
        assert_eq!(records[1].value, "00.0");
    }

    #[test]
    fn test_parse_skips_malformed_text() {
        assert!(ObisRecordParser::parse_body("").is_empty());
        assert!(ObisRecordParser::parse_body("1-0:1.8(12*kWh)").is_empty());
        assert!(ObisRecordParser::parse_body("1-0:1.8.0(12*kWh").is_empty());
        assert!(ObisRecordParser::parse_body("1-0:1.8.0(12 kWh)").is_empty());
    }

    #[test]
    fn test_codes() {
        let codes: Vec<&str> = ObisRecordParser::codes(SAMPLE).collect();
        assert_eq!(codes, vec!["0-0:1.0.0", "1-0:1.8.0", "1-0:32.7.0", "1-0:99.9.9"]);
    }
}
