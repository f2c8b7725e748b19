//! The queryable wrapper around a parsed provider response.

use crate::value::Value;

/// A parsed oEmbed response plus its originating provider and URL.
///
/// Immutable once constructed; one is created per `transform` call and
/// handed to the winning conditional handler.
#[derive(Debug, Clone)]
pub struct EmbedResult {
    fields: Value,
    provider_id: String,
    url: String,
}

impl EmbedResult {
    pub(crate) fn new(fields: Value, provider_id: String, url: String) -> Self {
        Self {
            fields,
            provider_id,
            url,
        }
    }

    /// The id of the provider whose pattern matched the URL.
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// The originating content URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The full parsed field mapping.
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// A named field, if the response carried it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A named field's string value.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Whether a field exists and equals the expected string, exactly and
    /// case-sensitively.
    pub fn field_equals(&self, name: &str, expected: &str) -> bool {
        self.field_str(name) == Some(expected)
    }

    /// The response's primary textual payload, used when no conditional
    /// handler matches: `html`, else `url`, else the empty string.
    pub fn primary_content(&self) -> String {
        self.field_str("html")
            .or_else(|| self.field_str("url"))
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn result(pairs: &[(&str, &str)]) -> EmbedResult {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<HashMap<_, _>>();
        EmbedResult::new(
            Value::Object(fields),
            "test1".to_string(),
            "http://test1.net/foo".to_string(),
        )
    }

    #[test]
    fn test_field_access() {
        let r = result(&[("html", "foo"), ("type", "video")]);
        assert_eq!(r.field_str("html"), Some("foo"));
        assert!(r.field_equals("type", "video"));
        assert!(!r.field_equals("type", "Video"));
        assert!(!r.field_equals("missing", "video"));
    }

    #[test]
    fn test_primary_content_prefers_html() {
        let r = result(&[("html", "foo"), ("url", "http://x")]);
        assert_eq!(r.primary_content(), "foo");
    }

    #[test]
    fn test_primary_content_falls_back_to_url() {
        let r = result(&[("url", "http://fakesville")]);
        assert_eq!(r.primary_content(), "http://fakesville");
    }

    #[test]
    fn test_primary_content_empty_when_absent() {
        let r = result(&[("title", "x")]);
        assert_eq!(r.primary_content(), "");
    }
}
