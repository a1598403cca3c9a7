use crate::error::Result;
use crate::inventory::ScanResult;

use super::OutputFormatter;

/// Pretty-printed JSON rendering of the whole scan result. The shape is
/// the serde form of [`ScanResult`] itself, so library and CLI consumers
/// see the same document.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ScanResult) -> Result<String> {
        let mut json = serde_json::to_string_pretty(result)?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
