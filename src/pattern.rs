//! Glob-style URL pattern compilation.
//!
//! Provider schemes use `*` as "zero or more characters". A compiled pattern
//! matches the entire URL string — partial matches never count.

use crate::error::{Error, Result};
use regex::Regex;

/// A provider scheme compiled into a full-string match predicate.
#[derive(Debug, Clone)]
pub struct Pattern {
    glob: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a glob scheme into an anchored pattern.
    ///
    /// Literal segments are regex-escaped; each `*` becomes an unbounded
    /// wildcard. The provider id is only used for error context.
    pub fn compile(provider: &str, glob: &str) -> Result<Self> {
        let mut expr = String::with_capacity(glob.len() + 8);
        expr.push('^');
        for (i, segment) in glob.split('*').enumerate() {
            if i > 0 {
                expr.push_str(".*");
            }
            expr.push_str(&regex::escape(segment));
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| Error::InvalidScheme {
            provider: provider.to_string(),
            pattern: glob.to_string(),
            source,
        })?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// Whether the URL matches this pattern in full.
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// The original glob this pattern was compiled from.
    pub fn glob(&self) -> &str {
        &self.glob
    }
}
