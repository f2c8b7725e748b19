//! # unfurl
//!
//! A library for resolving URLs into embeddable content through registered
//! oEmbed providers.
//!
//! `unfurl` matches a URL against provider URL patterns, fetches structured
//! metadata from the provider's oEmbed endpoint, and dispatches the parsed
//! result to caller-declared, content-aware handlers — optionally rendering
//! the output through a template engine.
//!
//! ## Features
//!
//! - **Provider registry**: glob-scheme matching in registration order,
//!   loaded from YAML documents or registered ad hoc
//! - **Pluggable transport**: fetchers are selected by method name; the
//!   built-in "NetHTTP" fetcher uses blocking reqwest
//! - **Pluggable parsing**: one formatter per format, with competing XML
//!   backends selected by an explicit preference order
//! - **Priority dispatch**: provider conditions beat URL-regex conditions,
//!   which beat field conditions, which beat the catch-all — independent of
//!   declaration order
//! - **Template resolution**: identifier-to-file resolution with candidate
//!   extensions, host view directories, and per-extension engine selection
//!
//! ## Examples
//!
//! ```no_run
//! use unfurl::Registry;
//!
//! fn main() -> unfurl::Result<()> {
//!     let mut registry = Registry::new();
//!     registry.load_defaults(&[]);
//!     registry.register_from_file("providers.yml")?;
//!
//!     let embed = registry.transform("https://vimeo.com/1234", |handlers| {
//!         handlers.field_equals("type", "video", |r, _url| r.primary_content());
//!         handlers.any_template("embed.html");
//!     })?;
//!     println!("{embed}");
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Registration is a single-writer phase; serialize it yourself. Once the
//! registry has stabilized, `transform` takes `&self` and concurrent calls
//! from multiple threads are safe.

pub mod dispatch;
pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod pattern;
pub mod provider;
pub mod registry;
pub mod result;
pub mod template;
pub mod value;

pub use dispatch::{Action, Condition, Handlers};
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use formatter::Formatter;
pub use pattern::Pattern;
pub use provider::{ConfigDocument, Endpoints, Provider, ProviderSpec, RegisterConfig, Schemes};
pub use registry::Registry;
pub use result::EmbedResult;
pub use template::{
    StaticViews, TemplateEngine, TemplateResolver, TemplateSpec, ViewEnvironment,
};
pub use value::Value;
