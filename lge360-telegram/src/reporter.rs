//! Unhandled OBIS code reporting

use crate::framer::Telegram;
use crate::parser::ObisRecordParser;
use crate::registry::Registry;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Lists codes that appear in a telegram but have no registry entry
#[derive(Debug, Clone)]
pub struct UnhandledCodeReporter {
    registry: Arc<Registry>,
}

impl UnhandledCodeReporter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn report(&self, telegram: &Telegram) -> BTreeSet<String> {
        ObisRecordParser::codes(telegram.body())
            .filter(|code| !self.registry.contains(code))
            .map(str::to_string)
            .collect()
    }
}
