//! Conditional handler declaration and fixed-priority dispatch.
//!
//! Callers declare an ordered set of `(condition, action)` entries against a
//! transform call. Selection does not follow declaration order: provider
//! conditions always beat URL-regex conditions, which beat field conditions,
//! which beat the catch-all. Declaration order only breaks ties within one
//! tier. Exactly one handler (or the primary-content fallback) runs per
//! transform.

use crate::result::EmbedResult;
use regex::Regex;
use tracing::trace;

/// Handler function signature: receives the result and the originating URL.
pub type HandlerFn = Box<dyn Fn(&EmbedResult, &str) -> String>;

/// A caller-declared predicate over an `EmbedResult`.
pub enum Condition {
    /// True iff the result came from the named provider.
    Provider(String),
    /// True iff the originating URL matches the regex.
    UrlRegex(Regex),
    /// True iff the named field exists and equals the expected value.
    Field(String, String),
    /// Always true.
    Any,
}

impl Condition {
    fn evaluate(&self, result: &EmbedResult, url: &str) -> bool {
        match self {
            Condition::Provider(id) => result.provider_id() == id,
            Condition::UrlRegex(regex) => regex.is_match(url),
            Condition::Field(name, expected) => result.field_equals(name, expected),
            Condition::Any => true,
        }
    }

    /// Priority tier; lower wins. Independent of declaration order.
    fn tier(&self) -> u8 {
        match self {
            Condition::Provider(_) => 0,
            Condition::UrlRegex(_) => 1,
            Condition::Field(_, _) => 2,
            Condition::Any => 3,
        }
    }
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Provider(id) => write!(f, "Provider({})", id),
            Condition::UrlRegex(regex) => write!(f, "UrlRegex({})", regex),
            Condition::Field(name, expected) => write!(f, "Field({} == {})", name, expected),
            Condition::Any => write!(f, "Any"),
        }
    }
}

/// What to do when an entry wins.
pub enum Action {
    /// Run a handler function; its return value is the transform output.
    Call(HandlerFn),
    /// Resolve and render the identified template with the result's fields.
    Template(String),
}

struct Entry {
    condition: Condition,
    action: Action,
}

/// The ordered conditional-entry set a caller declares for one transform.
///
/// ```
/// use unfurl::Handlers;
/// use regex::Regex;
///
/// let mut handlers = Handlers::new();
/// handlers.from_provider("vimeo", |r, _url| r.primary_content());
/// handlers.matches_url(Regex::new(r"\.gif$").unwrap(), |_r, url| format!("<img src=\"{}\"/>", url));
/// handlers.field_equals("type", "video", |r, _url| r.field_str("html").unwrap_or("").to_string());
/// handlers.any_template("embed.html");
/// ```
#[derive(Default)]
pub struct Handlers {
    entries: Vec<Entry>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, condition: Condition, action: Action) -> &mut Self {
        self.entries.push(Entry { condition, action });
        self
    }

    /// Handle results originating from the named provider.
    pub fn from_provider<F>(&mut self, id: &str, handler: F) -> &mut Self
    where
        F: Fn(&EmbedResult, &str) -> String + 'static,
    {
        self.push(
            Condition::Provider(id.to_string()),
            Action::Call(Box::new(handler)),
        )
    }

    /// Handle results whose originating URL matches the regex.
    pub fn matches_url<F>(&mut self, regex: Regex, handler: F) -> &mut Self
    where
        F: Fn(&EmbedResult, &str) -> String + 'static,
    {
        self.push(Condition::UrlRegex(regex), Action::Call(Box::new(handler)))
    }

    /// Handle results whose named field equals the expected value.
    pub fn field_equals<F>(&mut self, field: &str, expected: &str, handler: F) -> &mut Self
    where
        F: Fn(&EmbedResult, &str) -> String + 'static,
    {
        self.push(
            Condition::Field(field.to_string(), expected.to_string()),
            Action::Call(Box::new(handler)),
        )
    }

    /// Handle any result.
    pub fn any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&EmbedResult, &str) -> String + 'static,
    {
        self.push(Condition::Any, Action::Call(Box::new(handler)))
    }

    /// Render a template for results originating from the named provider.
    pub fn from_provider_template(&mut self, id: &str, template: &str) -> &mut Self {
        self.push(
            Condition::Provider(id.to_string()),
            Action::Template(template.to_string()),
        )
    }

    /// Render a template for results whose URL matches the regex.
    pub fn matches_url_template(&mut self, regex: Regex, template: &str) -> &mut Self {
        self.push(
            Condition::UrlRegex(regex),
            Action::Template(template.to_string()),
        )
    }

    /// Render a template for results whose named field equals the value.
    pub fn field_equals_template(
        &mut self,
        field: &str,
        expected: &str,
        template: &str,
    ) -> &mut Self {
        self.push(
            Condition::Field(field.to_string(), expected.to_string()),
            Action::Template(template.to_string()),
        )
    }

    /// Render a template for any result.
    pub fn any_template(&mut self, template: &str) -> &mut Self {
        self.push(Condition::Any, Action::Template(template.to_string()))
    }

    /// Select the winning entry's action under the fixed priority policy.
    ///
    /// Returns `None` when no declared condition matches, in which case the
    /// caller falls back to the result's primary content.
    pub(crate) fn select(&self, result: &EmbedResult, url: &str) -> Option<&Action> {
        for tier in 0..=3 {
            let winner = self
                .entries
                .iter()
                .find(|e| e.condition.tier() == tier && e.condition.evaluate(result, url));
            if let Some(entry) = winner {
                trace!(condition = ?entry.condition, "conditional entry selected");
                return Some(&entry.action);
            }
        }
        None
    }
}
