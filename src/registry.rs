//! The provider registry and transform entry point.
//!
//! `Registry` is an explicit context object: providers, compiled match
//! patterns, fetchers, formatters, the active fetch method, and the
//! template resolver all live here. Registration is a single-writer phase;
//! once it has stabilized, `transform` takes `&self` and concurrent calls
//! are safe. Serializing concurrent *registration* is the caller's
//! responsibility.

use crate::dispatch::{Action, Handlers};
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, NetHttpFetcher};
use crate::formatter::{self, Formatter};
use crate::pattern::Pattern;
use crate::provider::{
    ConfigDocument, Endpoints, Provider, ProviderSpec, RegisterConfig, Schemes, DEFAULT_FORMAT,
};
use crate::result::EmbedResult;
use crate::template::TemplateResolver;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// The process catalog of providers, fetchers, and formatters.
///
/// ```no_run
/// use unfurl::Registry;
///
/// fn main() -> unfurl::Result<()> {
///     let mut registry = Registry::new();
///     registry.load_defaults(&[]);
///     registry.register_provider(
///         "vimeo",
///         "https://vimeo.com/api/oembed.{format}",
///         Some("json"),
///         "https://vimeo.com/*".into(),
///     )?;
///
///     let embed = registry.transform("https://vimeo.com/1234", |handlers| {
///         handlers.field_equals("type", "video", |r, _url| r.primary_content());
///     })?;
///     println!("{embed}");
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct Registry {
    providers: HashMap<String, Provider>,
    /// Ordered (pattern, provider id) match list. Registration order is the
    /// match precedence.
    matches: Vec<(Pattern, String)>,
    fetchers: HashMap<String, Box<dyn Fetcher>>,
    formatters: HashMap<String, Box<dyn Formatter>>,
    fetch_method: Option<String>,
    templates: TemplateResolver,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of providers.
    ///
    /// All-or-nothing: every endpoint id must come with non-empty scheme
    /// information in `providers`, or the whole call fails and nothing is
    /// registered. Endpoints register in declaration order, which is the
    /// match precedence among them. `config.method` overrides the active
    /// fetch method; the method defaults to "NetHTTP" only when it was
    /// never set.
    pub fn register(
        &mut self,
        config: RegisterConfig,
        endpoints: Endpoints,
        providers: BTreeMap<String, ProviderSpec>,
    ) -> Result<()> {
        let mut staged = Vec::new();

        for (id, endpoint) in endpoints {
            let spec = providers
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::MissingSchemes(id.clone()))?;
            let globs = spec.schemes.into_vec();
            if globs.is_empty() {
                return Err(Error::EmptySchemes(id));
            }

            let format = spec.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
            let mut schemes = Vec::with_capacity(globs.len());
            for glob in &globs {
                schemes.push(Pattern::compile(&id, glob)?);
            }
            staged.push(Provider::new(id, endpoint, format, schemes));
        }

        // Validation passed for every provider; commit.
        for provider in staged {
            debug!(provider = provider.id(), format = provider.format(), "registering provider");
            for pattern in provider.schemes() {
                self.matches
                    .push((pattern.clone(), provider.id().to_string()));
            }
            self.providers.insert(provider.id().to_string(), provider);
        }

        if let Some(method) = config.method {
            self.fetch_method = Some(method);
        } else if self.fetch_method.is_none() {
            self.fetch_method = Some(crate::fetcher::http::NET_HTTP.to_string());
        }

        Ok(())
    }

    /// Register a single provider ad hoc, appending to the catalog.
    pub fn register_provider(
        &mut self,
        id: &str,
        endpoint: &str,
        format: Option<&str>,
        schemes: Schemes,
    ) -> Result<()> {
        let mut providers = BTreeMap::new();
        providers.insert(
            id.to_string(),
            ProviderSpec {
                format: format.map(str::to_string),
                schemes,
            },
        );
        let mut endpoints = Endpoints::new();
        endpoints.insert(id, endpoint);

        self.register(RegisterConfig::default(), endpoints, providers)
    }

    /// Load a registration configuration document from a YAML file.
    pub fn register_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let document: ConfigDocument =
            serde_yaml::from_str(&contents).map_err(|e| Error::Config {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;

        self.register(document.config, document.endpoints, document.providers)
    }

    /// Add a fetcher under the method name it declares.
    pub fn register_fetcher(&mut self, fetcher: impl Fetcher) {
        self.fetchers
            .insert(fetcher.name().to_string(), Box::new(fetcher));
    }

    /// Add a formatter under the format it declares, replacing any previous
    /// formatter for that format.
    pub fn register_formatter(&mut self, formatter: impl Formatter) {
        self.formatters
            .insert(formatter.format().to_string(), Box::new(formatter));
    }

    /// Install the built-in fetcher and the default formatter per format.
    ///
    /// `excluded` names formatter backends to skip; per format, the first
    /// preferred backend not excluded is installed, else the in-process
    /// fallback. Idempotent for a given exclusion list, and each format's
    /// selection is replaced wholesale.
    pub fn load_defaults(&mut self, excluded: &[&str]) {
        self.register_fetcher(NetHttpFetcher::new());
        if self.fetch_method.is_none() {
            self.fetch_method = Some(crate::fetcher::http::NET_HTTP.to_string());
        }
        for (format, formatter) in formatter::default_formatters(excluded) {
            debug!(format, backend = formatter.name(), "default formatter selected");
            self.formatters.insert(format.to_string(), formatter);
        }
    }

    /// Reset providers, patterns, fetchers, formatters, and the fetch
    /// method. Template configuration is left untouched.
    pub fn clear(&mut self) {
        self.providers.clear();
        self.matches.clear();
        self.fetchers.clear();
        self.formatters.clear();
        self.fetch_method = None;
    }

    /// The active fetch method name, if registration has set one.
    pub fn fetch_method(&self) -> Option<&str> {
        self.fetch_method.as_deref()
    }

    /// Number of (pattern, provider) match entries, in registration order.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// The active formatter backend name for a format, if any.
    pub fn formatter_name(&self, format: &str) -> Option<&str> {
        self.formatters.get(format).map(|f| f.name())
    }

    /// The template resolver configuration.
    pub fn templates(&self) -> &TemplateResolver {
        &self.templates
    }

    /// Mutable access to the template resolver configuration.
    pub fn templates_mut(&mut self) -> &mut TemplateResolver {
        &mut self.templates
    }

    /// Find the provider for a URL: first full-string pattern match in
    /// registration order. `None` is not an error here; only `transform`
    /// requires a match.
    pub fn resolve(&self, url: &str) -> Option<&Provider> {
        self.matches
            .iter()
            .find(|(pattern, _)| pattern.matches(url))
            .and_then(|(_, id)| self.providers.get(id))
    }

    /// Transform a URL into embeddable content.
    ///
    /// Resolves the provider, fetches and parses the oEmbed response, then
    /// dispatches to the caller-declared conditional handlers. When no
    /// handler condition matches, the result's primary content field is
    /// returned verbatim.
    pub fn transform<B>(&self, url: &str, declare: B) -> Result<String>
    where
        B: FnOnce(&mut Handlers),
    {
        let provider = self
            .resolve(url)
            .ok_or_else(|| Error::NoProviderMatch(url.to_string()))?;
        debug!(url, provider = provider.id(), "provider resolved");

        let method = self
            .fetch_method
            .as_deref()
            .unwrap_or(crate::fetcher::http::NET_HTTP);
        let fetcher = self
            .fetchers
            .get(method)
            .ok_or_else(|| Error::UnknownFetchMethod(method.to_string()))?;

        let raw = fetcher.fetch(&provider.request_url(url))?;

        let formatter = self
            .formatters
            .get(provider.format())
            .ok_or_else(|| Error::UnknownFormat(provider.format().to_string()))?;
        let fields = formatter.parse(&raw)?;

        let result = EmbedResult::new(fields, provider.id().to_string(), url.to_string());

        let mut handlers = Handlers::new();
        declare(&mut handlers);

        match handlers.select(&result, url) {
            Some(Action::Call(handler)) => Ok(handler(&result, url)),
            Some(Action::Template(identifier)) => {
                self.templates.render_identifier(identifier, result.fields())
            }
            None => Ok(result.primary_content()),
        }
    }
}
