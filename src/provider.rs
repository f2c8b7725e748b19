//! Provider definitions and registration configuration documents.

use crate::pattern::Pattern;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// Format assumed when a provider declares none.
pub const DEFAULT_FORMAT: &str = "json";

/// A registered oEmbed content source.
///
/// Owns the compiled patterns for its schemes; the registry keeps a separate
/// ordered match list referencing providers by id.
#[derive(Debug, Clone)]
pub struct Provider {
    id: String,
    endpoint: String,
    format: String,
    schemes: Vec<Pattern>,
}

impl Provider {
    pub(crate) fn new(id: String, endpoint: String, format: String, schemes: Vec<Pattern>) -> Self {
        Self {
            id,
            endpoint,
            format,
            schemes,
        }
    }

    /// The provider's registration id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The endpoint template, with a `{format}` placeholder.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The response format this provider serves ("json" unless configured).
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The compiled URL patterns for this provider, in declaration order.
    pub fn schemes(&self) -> &[Pattern] {
        &self.schemes
    }

    /// Build the request URL for a content URL.
    ///
    /// Substitutes `{format}` in the endpoint template and appends the
    /// percent-encoded content URL as a `url` query parameter.
    pub fn request_url(&self, url: &str) -> String {
        let endpoint = self.endpoint.replace("{format}", &self.format);
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}url={}", endpoint, separator, percent_encode(url))
    }
}

/// Percent-encode a query parameter value (RFC 3986 unreserved set).
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Top-level registration options (the `config` argument to `register`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterConfig {
    /// Fetch method override; the registry defaults to "NetHTTP" when unset.
    #[serde(default)]
    pub method: Option<String>,
}

/// Per-provider options: optional format plus one or more schemes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSpec {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub schemes: Schemes,
}

/// Scheme declarations accept a single glob or a sequence of globs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Schemes {
    One(String),
    Many(Vec<String>),
}

impl Default for Schemes {
    fn default() -> Self {
        Schemes::Many(Vec::new())
    }
}

impl Schemes {
    /// Flatten into a glob list, preserving declaration order.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Schemes::One(glob) => vec![glob],
            Schemes::Many(globs) => globs,
        }
    }
}

impl From<&str> for Schemes {
    fn from(glob: &str) -> Self {
        Schemes::One(glob.to_string())
    }
}

impl From<Vec<String>> for Schemes {
    fn from(globs: Vec<String>) -> Self {
        Schemes::Many(globs)
    }
}

/// The `endpoints` section of a configuration document: provider id to
/// endpoint template, in declaration order.
///
/// Registration walks this table front to back, so the order endpoints
/// appear in a document is the match precedence among them.
#[derive(Debug, Clone, Default)]
pub struct Endpoints(Vec<(String, String)>);

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an endpoint entry.
    pub fn insert(&mut self, id: impl Into<String>, endpoint: impl Into<String>) {
        self.0.push((id.into(), endpoint.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Endpoints {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<const N: usize> From<[(String, String); N]> for Endpoints {
    fn from(entries: [(String, String); N]) -> Self {
        Self(entries.into())
    }
}

impl<'de> Deserialize<'de> for Endpoints {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EndpointsVisitor;

        impl<'de> Visitor<'de> for EndpointsVisitor {
            type Value = Endpoints;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of provider id to endpoint template")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(Endpoints(entries))
            }
        }

        deserializer.deserialize_map(EndpointsVisitor)
    }
}

/// The shape of a registration configuration document.
///
/// ```yaml
/// config:
///   method: NetHTTP
/// providers:
///   test1:
///     format: json
///     schemes:
///       - http://test1.net/*
/// endpoints:
///   test1: http://test1.net/oembed.{format}
/// ```
///
/// Endpoints in one document are registered in declaration order, which is
/// the match precedence among them. Ad hoc registrations append after
/// file-loaded ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub config: RegisterConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSpec>,
    #[serde(default)]
    pub endpoints: Endpoints,
}
