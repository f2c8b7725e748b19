//! Error types for the unfurl library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unfurl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while registering providers or transforming URLs.
#[derive(Error, Debug)]
pub enum Error {
    /// A provider was registered with an endpoint but no scheme information.
    #[error("Provider '{0}' has no scheme information")]
    MissingSchemes(String),

    /// A provider was registered with an explicitly empty scheme list.
    #[error("Provider '{0}' has an empty scheme list")]
    EmptySchemes(String),

    /// A provider scheme failed to compile into a matchable pattern.
    #[error("Provider '{provider}' has an invalid scheme '{pattern}': {source}")]
    InvalidScheme {
        provider: String,
        pattern: String,
        source: regex::Error,
    },

    /// No registered provider pattern matched the URL given to `transform`.
    #[error("No registered provider matches URL '{0}'")]
    NoProviderMatch(String),

    /// The active fetch method names a fetcher that was never registered.
    #[error("No fetcher registered under method name '{0}'")]
    UnknownFetchMethod(String),

    /// The resolved provider's format has no registered formatter.
    #[error("No formatter registered for format '{0}'")]
    UnknownFormat(String),

    /// A fetcher failed to retrieve content for a URL.
    ///
    /// The transport error is carried verbatim; the core does not retry.
    #[error("Failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A formatter failed to parse fetched content.
    #[error("Failed to parse {format} content: {source}")]
    Parse {
        format: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to load or parse a registration configuration document.
    #[error("Failed to load provider configuration from {path}: {source}")]
    Config {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No candidate file exists for a requested template identifier.
    #[error("Template '{0}' not found under any configured search path")]
    TemplateNotFound(String),

    /// The configured template processor names an engine that does not exist.
    #[error("No template engine registered under name '{0}'")]
    UnknownEngine(String),

    /// A template engine failed while rendering a resolved template.
    #[error("Failed to render template '{template}': {source}")]
    Render {
        template: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to read a template or configuration file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_messages() {
        let err = Error::MissingSchemes("fake".into());
        assert!(err.to_string().contains("no scheme information"));

        let err = Error::EmptySchemes("fake".into());
        assert!(err.to_string().contains("empty scheme list"));
    }

    #[test]
    fn test_no_provider_match_names_url() {
        let err = Error::NoProviderMatch("http://nowhere/1".into());
        assert!(err.to_string().contains("http://nowhere/1"));
    }
}
