//! Response format abstraction.
//!
//! The `Formatter` trait separates response parsing from transport. Each
//! formatter declares the format key it serves via `format()` and a backend
//! name via `name()`; the registry keeps one active formatter per format.
//!
//! Built-in formatters:
//! - `JsonFormatter` — format "json", backed by serde_json
//! - `RoXmlFormatter` — format "xml", backed by roxmltree
//! - `QuickXmlFormatter` — format "xml", backed by quick-xml
//! - `ScanXmlFormatter` — format "xml", in-process scanner fallback
//!
//! `default_formatter` resolves which backend serves a format: the first
//! preferred backend not named in the exclusion list wins, and when every
//! preferred backend is excluded the in-process fallback is installed.

pub mod json;
pub mod xml;

use crate::error::Result;
use crate::value::Value;

pub use json::JsonFormatter;
pub use xml::{QuickXmlFormatter, RoXmlFormatter, ScanXmlFormatter};

/// A format parser turning raw fetched content into a field mapping.
///
/// # Implementing a Formatter
///
/// ```
/// use unfurl::formatter::Formatter;
/// use unfurl::{Result, Value};
/// use std::collections::HashMap;
///
/// struct UpperFormatter;
///
/// impl Formatter for UpperFormatter {
///     fn parse(&self, raw: &str) -> Result<Value> {
///         let mut fields = HashMap::new();
///         fields.insert("html".to_string(), Value::String(raw.to_uppercase()));
///         Ok(Value::Object(fields))
///     }
///
///     fn format(&self) -> &str {
///         "upper"
///     }
///
///     fn name(&self) -> &str {
///         "upper"
///     }
/// }
/// ```
pub trait Formatter: Send + Sync + 'static {
    /// Parse raw content into a field mapping.
    fn parse(&self, raw: &str) -> Result<Value>;

    /// The format key this formatter serves (the registry key).
    fn format(&self) -> &str;

    /// Backend name, distinct from the format when multiple backends
    /// compete for it (e.g., "roxmltree" vs "quick-xml" for "xml").
    fn name(&self) -> &str;
}

/// Default backend selection for one format.
struct FormatDefault {
    format: &'static str,
    preferred: &'static [&'static str],
    fallback: &'static str,
}

/// Preference order among competing default backends.
///
/// The order is configuration, not inference: first non-excluded preferred
/// backend wins, else the in-process fallback.
const FORMAT_DEFAULTS: &[FormatDefault] = &[
    FormatDefault {
        format: "json",
        preferred: &["serde_json"],
        fallback: "serde_json",
    },
    FormatDefault {
        format: "xml",
        preferred: &["roxmltree", "quick-xml"],
        fallback: "xmlscan",
    },
];

fn backend(name: &str) -> Box<dyn Formatter> {
    match name {
        "serde_json" => Box::new(JsonFormatter),
        "roxmltree" => Box::new(RoXmlFormatter),
        "quick-xml" => Box::new(QuickXmlFormatter),
        "xmlscan" => Box::new(ScanXmlFormatter),
        other => unreachable!("unknown built-in formatter backend '{}'", other),
    }
}

/// Resolve the default formatter for every recognized format, honoring the
/// exclusion list. Returns `(format, formatter)` pairs.
pub(crate) fn default_formatters(excluded: &[&str]) -> Vec<(&'static str, Box<dyn Formatter>)> {
    FORMAT_DEFAULTS
        .iter()
        .map(|d| {
            let selected = d
                .preferred
                .iter()
                .find(|name| !excluded.contains(*name))
                .copied()
                .unwrap_or(d.fallback);
            (d.format, backend(selected))
        })
        .collect()
}
