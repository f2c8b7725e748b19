//! Template resolution and rendering.
//!
//! A template identifier resolves to a concrete file and an engine in three
//! steps: an existing path (absolute, or relative to the configured
//! `template_root`) wins outright; identifiers without an extension try
//! candidate extensions under the root and the host application's view
//! directories; identifiers with an extension are also searched under the
//! view directories. Engine selection follows the configured processor
//! override, else the file extension.
//!
//! Built-in engines:
//! - `TeraEngine` — "tera", extensions `tera` and `html`
//! - `SimpleEngine` — "simple", extensions `txt` and `html`; in-process
//!   `{field}` substitution with no external dependencies

use crate::error::{Error, Result};
use crate::value::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Candidate extensions tried for identifiers without one, in preference
/// order. Host-declared handler extensions are tried before these.
const DEFAULT_EXTENSIONS: &[&str] = &["html", "tera", "txt"];

/// A rendering engine for resolved template files.
pub trait TemplateEngine: Send + Sync + 'static {
    /// Render template source against the parsed field mapping.
    fn render(&self, template: &str, source: &str, fields: &Value) -> Result<String>;

    /// File extensions this engine claims (without the leading dot).
    fn extensions(&self) -> &[&str];

    /// Engine name, usable as a processor override.
    fn name(&self) -> &str;
}

/// Host-application integration: conventional view directories and the
/// template handler extensions the host declares support for.
///
/// Supplied by the surrounding application; consulted only as an additional
/// search and engine-selection source.
pub trait ViewEnvironment: Send + Sync + 'static {
    /// Directories searched after `template_root`, in order.
    fn view_directories(&self) -> Vec<PathBuf>;

    /// Handler extensions the host supports, tried before the built-in
    /// candidate extensions and preferred when an extension is claimed by
    /// several engines.
    fn template_handlers(&self) -> Vec<String>;
}

/// A fixed `ViewEnvironment` built from plain lists.
pub struct StaticViews {
    directories: Vec<PathBuf>,
    handlers: Vec<String>,
}

impl StaticViews {
    pub fn new(directories: Vec<PathBuf>, handlers: Vec<String>) -> Self {
        Self {
            directories,
            handlers,
        }
    }
}

impl ViewEnvironment for StaticViews {
    fn view_directories(&self) -> Vec<PathBuf> {
        self.directories.clone()
    }

    fn template_handlers(&self) -> Vec<String> {
        self.handlers.clone()
    }
}

/// A resolved template: the requested identifier, the concrete file, and
/// the engine that will render it. Resolved once per render call.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub requested: String,
    pub path: PathBuf,
    pub engine: String,
}

/// Locates template files and selects rendering engines.
pub struct TemplateResolver {
    template_root: Option<PathBuf>,
    processor: Option<String>,
    environment: Option<Box<dyn ViewEnvironment>>,
    engines: Vec<Box<dyn TemplateEngine>>,
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self {
            template_root: None,
            processor: None,
            environment: None,
            engines: vec![Box::new(TeraEngine), Box::new(SimpleEngine)],
        }
    }
}

impl TemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory template identifiers resolve against.
    pub fn set_template_root(&mut self, root: impl Into<PathBuf>) {
        self.template_root = Some(root.into());
    }

    /// Clear the template root.
    pub fn clear_template_root(&mut self) {
        self.template_root = None;
    }

    /// The configured template root, if any.
    pub fn template_root(&self) -> Option<&Path> {
        self.template_root.as_deref()
    }

    /// Force a specific engine regardless of file extension, or `None` to
    /// return to extension-based inference.
    pub fn set_processor(&mut self, processor: Option<&str>) {
        self.processor = processor.map(str::to_string);
    }

    /// Install the host application's view integration.
    pub fn set_environment(&mut self, environment: impl ViewEnvironment) {
        self.environment = Some(Box::new(environment));
    }

    /// Register an additional rendering engine. Earlier registrations win
    /// ambiguous extensions.
    pub fn register_engine(&mut self, engine: impl TemplateEngine) {
        self.engines.push(Box::new(engine));
    }

    fn view_directories(&self) -> Vec<PathBuf> {
        self.environment
            .as_ref()
            .map(|env| env.view_directories())
            .unwrap_or_default()
    }

    /// Candidate extensions: host handlers first, then the built-in order.
    fn candidate_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .environment
            .as_ref()
            .map(|env| env.template_handlers())
            .unwrap_or_default();
        for ext in DEFAULT_EXTENSIONS {
            if !extensions.iter().any(|e| e == ext) {
                extensions.push((*ext).to_string());
            }
        }
        extensions
    }

    /// Resolve a template identifier to a file and engine.
    pub fn resolve(&self, identifier: &str) -> Result<TemplateSpec> {
        let requested = Path::new(identifier);

        if requested.extension().is_some() {
            let mut candidates = Vec::new();
            if let Some(root) = &self.template_root {
                candidates.push(root.join(requested));
            }
            candidates.push(requested.to_path_buf());
            for dir in self.view_directories() {
                candidates.push(dir.join(requested));
            }

            if let Some(path) = candidates.into_iter().find(|p| p.is_file()) {
                let engine = self.engine_for(&path)?;
                debug!(template = identifier, path = %path.display(), engine = %engine, "template resolved");
                return Ok(TemplateSpec {
                    requested: identifier.to_string(),
                    path,
                    engine,
                });
            }
            return Err(Error::TemplateNotFound(identifier.to_string()));
        }

        let mut directories = Vec::new();
        if let Some(root) = &self.template_root {
            directories.push(root.clone());
        }
        directories.extend(self.view_directories());

        for dir in &directories {
            for ext in self.candidate_extensions() {
                let path = dir.join(format!("{}.{}", identifier, ext));
                if path.is_file() {
                    let engine = self.engine_for(&path)?;
                    debug!(template = identifier, path = %path.display(), engine = %engine, "template resolved");
                    return Ok(TemplateSpec {
                        requested: identifier.to_string(),
                        path,
                        engine,
                    });
                }
            }
        }

        Err(Error::TemplateNotFound(identifier.to_string()))
    }

    /// Select the engine for a resolved file.
    ///
    /// The processor override, when set, beats extension inference. An
    /// extension claimed by several engines goes to one claiming a
    /// host-declared handler extension, else the first registered claimant.
    /// Unclaimed extensions fall back to the first registered engine.
    fn engine_for(&self, path: &Path) -> Result<String> {
        if let Some(processor) = &self.processor {
            return self
                .engines
                .iter()
                .find(|e| e.name() == processor.as_str())
                .map(|e| e.name().to_string())
                .ok_or_else(|| Error::UnknownEngine(processor.clone()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let claimants: Vec<&dyn TemplateEngine> = self
            .engines
            .iter()
            .filter(|e| e.extensions().contains(&extension.as_str()))
            .map(|e| e.as_ref())
            .collect();

        let handlers = self
            .environment
            .as_ref()
            .map(|env| env.template_handlers())
            .unwrap_or_default();

        let chosen = claimants
            .iter()
            .find(|e| {
                e.extensions()
                    .iter()
                    .any(|ext| handlers.iter().any(|h| h == ext))
            })
            .or_else(|| claimants.first())
            .map(|e| e.name().to_string());

        match chosen {
            Some(name) => Ok(name),
            // Unclaimed extension: built-in default engine.
            None => Ok(self.engines[0].name().to_string()),
        }
    }

    /// Render a resolved template against a field mapping.
    pub fn render(&self, spec: &TemplateSpec, fields: &Value) -> Result<String> {
        let source = std::fs::read_to_string(&spec.path)?;
        let engine = self
            .engines
            .iter()
            .find(|e| e.name() == spec.engine)
            .ok_or_else(|| Error::UnknownEngine(spec.engine.clone()))?;
        engine.render(&spec.requested, &source, fields)
    }

    /// Resolve and render in one step.
    pub fn render_identifier(&self, identifier: &str, fields: &Value) -> Result<String> {
        let spec = self.resolve(identifier)?;
        self.render(&spec, fields)
    }
}

/// Tera-backed rendering. Autoescaping is disabled: templates emit embed
/// markup verbatim.
pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn render(&self, template: &str, source: &str, fields: &Value) -> Result<String> {
        let render_error = |e: tera::Error| Error::Render {
            template: template.to_string(),
            source: Box::new(e),
        };

        let mut tera = tera::Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(template, source)
            .map_err(render_error)?;
        let context = tera::Context::from_value(fields.to_json()).map_err(render_error)?;
        tera.render(template, &context).map_err(render_error)
    }

    fn extensions(&self) -> &[&str] {
        &["tera", "html"]
    }

    fn name(&self) -> &str {
        "tera"
    }
}

/// In-process `{field}` substitution. Unknown fields are left verbatim;
/// rendering never fails.
pub struct SimpleEngine;

impl TemplateEngine for SimpleEngine {
    fn render(&self, _template: &str, source: &str, fields: &Value) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '{' {
                out.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == '}' {
                    closed = true;
                    break;
                }
                name.push(inner);
            }
            match fields.get(&name) {
                Some(value) if closed => out.push_str(&value.to_string()),
                _ => {
                    out.push('{');
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
        }

        Ok(out)
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "html"]
    }

    fn name(&self) -> &str {
        "simple"
    }
}
