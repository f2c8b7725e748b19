//! JSON format support.

use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::value::Value;

/// Formatter for JSON oEmbed responses, backed by serde_json.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn parse(&self, raw: &str) -> Result<Value> {
        let json: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| Error::Parse {
                format: "json".to_string(),
                source: Box::new(e),
            })?;
        Ok(Value::from(json))
    }

    fn format(&self) -> &str {
        "json"
    }

    fn name(&self) -> &str {
        "serde_json"
    }
}
