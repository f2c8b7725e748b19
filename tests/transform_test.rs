//! End-to-end tests for the registration and transform pipeline.

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use unfurl::fetcher::Fetcher;
use unfurl::formatter::Formatter;
use unfurl::{Error, Registry, Result, StaticViews, Value};

/// Fetcher returning whatever body the test installed, under any name.
struct CannedFetcher {
    name: String,
    body: Arc<Mutex<String>>,
}

impl Fetcher for CannedFetcher {
    fn fetch(&self, _request_url: &str) -> Result<String> {
        Ok(self.body.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Formatter that ignores its input and always yields one url field.
struct FakeFormatter;

impl Formatter for FakeFormatter {
    fn parse(&self, _raw: &str) -> Result<Value> {
        let mut fields = HashMap::new();
        fields.insert(
            "url".to_string(),
            Value::String("http://fakesville".to_string()),
        );
        Ok(Value::Object(fields))
    }

    fn format(&self) -> &str {
        "fake_formatter"
    }

    fn name(&self) -> &str {
        "fake_formatter"
    }
}

const PROVIDERS_YAML: &str = r#"
config:
  method: canned
providers:
  test1:
    format: json
    schemes:
      - http://test1.net/*
  test2:
    format: json
    schemes:
      - http://test2.net/*
  test3:
    format: json
    schemes:
      - http://test3.net/*
endpoints:
  test1: http://test1.net/oembed.{format}
  test2: http://test2.net/oembed.{format}
  test3: http://test3.net/oembed.{format}
"#;

/// Registry loaded from the three-provider document, fetching canned JSON.
fn canned_registry(body: &str) -> (Registry, Arc<Mutex<String>>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers.yml");
    fs::write(&path, PROVIDERS_YAML).unwrap();

    let body = Arc::new(Mutex::new(body.to_string()));
    let mut registry = Registry::new();
    registry.load_defaults(&[]);
    registry.register_fetcher(CannedFetcher {
        name: "canned".to_string(),
        body: Arc::clone(&body),
    });
    registry.register_from_file(&path).unwrap();
    (registry, body)
}

fn write_template(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn yaml_document_registers_three_providers() {
    let (registry, _) = canned_registry("{}");
    assert_eq!(registry.match_count(), 3);
    assert_eq!(registry.fetch_method(), Some("canned"));
}

#[test]
fn ad_hoc_provider_appends_to_file_loaded_catalog() {
    let (mut registry, _) = canned_registry("{}");
    registry
        .register_provider(
            "test4",
            "http://test4/oembed.{format}",
            Some("xml"),
            "http://test4.*/*".into(),
        )
        .unwrap();
    assert_eq!(registry.match_count(), 4);
    assert_eq!(registry.resolve("http://test4.com/x").unwrap().id(), "test4");
}

#[test]
fn custom_fetcher_selected_by_method_name() {
    let (registry, _) = canned_registry(r#"{"html": "fakecontent"}"#);
    let out = registry
        .transform("http://test1.net/foo", |_handlers| {})
        .unwrap();
    assert_eq!(out, "fakecontent");
}

#[test]
fn custom_formatter_selected_by_provider_format() {
    let (mut registry, _) = canned_registry("");
    registry.register_formatter(FakeFormatter);
    registry
        .register_provider(
            "fake",
            "http://fake",
            Some("fake_formatter"),
            "http://fake/*".into(),
        )
        .unwrap();

    let out = registry
        .transform("http://fake/bar/baz", |_handlers| {})
        .unwrap();
    assert_eq!(out, "http://fakesville");
}

#[test]
fn provider_condition_always_wins() {
    let (registry, _) = canned_registry(r#"{"html": "foo", "type": "video"}"#);
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any(|_, _| "any".to_string());
            handlers.field_equals("type", "video", |_, _| "video".to_string());
            handlers.from_provider("test1", |_, _| "test1".to_string());
            handlers.matches_url(Regex::new(".").unwrap(), |_, _| "regex".to_string());
        })
        .unwrap();
    assert_eq!(out, "test1");
}

#[test]
fn regex_condition_beats_field_and_catch_all_in_any_order() {
    let (registry, _) = canned_registry(r#"{"html": "foo", "type": "video"}"#);

    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any(|_, _| "any".to_string());
            handlers.field_equals("type", "video", |_, _| "video".to_string());
            handlers.matches_url(Regex::new(".").unwrap(), |_, _| "regex".to_string());
        })
        .unwrap();
    assert_eq!(out, "regex");

    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.matches_url(Regex::new(".").unwrap(), |_, _| "regex".to_string());
            handlers.any(|_, _| "any".to_string());
            handlers.field_equals("type", "video", |_, _| "video".to_string());
        })
        .unwrap();
    assert_eq!(out, "regex");
}

#[test]
fn field_conditions_match_on_response_content() {
    let (registry, body) = canned_registry(r#"{"html": "foo", "type": "video"}"#);

    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any(|_, _| "any".to_string());
            handlers.field_equals("type", "video", |_, _| "video".to_string());
        })
        .unwrap();
    assert_eq!(out, "video");

    *body.lock().unwrap() = r#"{"html": "bar", "type": "hedgehog"}"#.to_string();
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.field_equals("type", "video", |_, _| "video".to_string());
            handlers.field_equals("type", "hedgehog", |_, _| "hedgey".to_string());
        })
        .unwrap();
    assert_eq!(out, "hedgey");
}

#[test]
fn unmatched_handlers_fall_back_to_primary_content() {
    let (registry, _) = canned_registry(r#"{"html": "foo", "type": "video"}"#);
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.field_equals("type", "audio", |_, _| "audio".to_string());
            handlers.from_provider("test2", |_, _| "test2".to_string());
            handlers.matches_url(Regex::new("baz").unwrap(), |_, _| "regex".to_string());
        })
        .unwrap();
    assert_eq!(out, "foo");
}

#[test]
fn unmatched_url_fails_transform() {
    let (registry, _) = canned_registry("{}");
    let err = registry
        .transform("http://unregistered.example/x", |_handlers| {})
        .unwrap_err();
    assert!(matches!(err, Error::NoProviderMatch(_)));
}

#[test]
fn handler_can_render_explicit_template_path() {
    let (registry, _) = canned_registry(r#"{"url": "template!"}"#);
    let templates = TempDir::new().unwrap();
    let path = write_template(&templates, "test.tera", "{{ url }} tera");

    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template(path.to_str().unwrap());
        })
        .unwrap();
    assert_eq!(out, "template! tera");
}

#[test]
fn template_root_resolves_bare_identifiers() {
    let (mut registry, _) = canned_registry(r#"{"url": "template!"}"#);
    let templates = TempDir::new().unwrap();
    write_template(&templates, "test.html", "{{ url }} html");

    registry.templates_mut().set_template_root(templates.path());
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("test.html");
        })
        .unwrap();
    assert_eq!(out, "template! html");
}

#[test]
fn processor_override_switches_rendering_engine() {
    let (mut registry, _) = canned_registry(r#"{"url": "template!"}"#);
    let templates = TempDir::new().unwrap();
    write_template(&templates, "test.html", "{url} simple");

    registry.templates_mut().set_template_root(templates.path());
    registry.templates_mut().set_processor(Some("simple"));
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("test.html");
        })
        .unwrap();
    assert_eq!(out, "template! simple");
}

#[test]
fn missing_template_raises() {
    let (registry, _) = canned_registry(r#"{"url": "template!"}"#);
    let err = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("does.not.exist");
        })
        .unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound(_)));
}

#[test]
fn host_view_directories_resolve_extensionless_identifiers() {
    let (mut registry, _) = canned_registry(r#"{"url": "views"}"#);
    let views = TempDir::new().unwrap();
    fs::create_dir(views.path().join("templates")).unwrap();
    write_template(&views, "templates/test.html", "{{ url }} html");

    registry
        .templates_mut()
        .set_environment(StaticViews::new(vec![views.path().to_path_buf()], vec![]));
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("templates/test");
        })
        .unwrap();
    assert_eq!(out, "views html");
}

#[test]
fn host_view_directories_resolve_identifiers_with_extension() {
    let (mut registry, _) = canned_registry(r#"{"url": "views"}"#);
    let views = TempDir::new().unwrap();
    fs::create_dir(views.path().join("templates")).unwrap();
    write_template(&views, "templates/test.tera", "{{ url }} tera");

    registry
        .templates_mut()
        .set_environment(StaticViews::new(vec![views.path().to_path_buf()], vec![]));
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("templates/test.tera");
        })
        .unwrap();
    assert_eq!(out, "views tera");
}

#[test]
fn host_declared_handlers_change_template_selection() {
    let (mut registry, _) = canned_registry(r#"{"url": "views"}"#);
    let views = TempDir::new().unwrap();
    write_template(&views, "test.html", "{{ url }} html");
    write_template(&views, "test.txt", "{url} txt");

    // With a "txt" handler declared, the txt template wins the search.
    registry.templates_mut().set_environment(StaticViews::new(
        vec![views.path().to_path_buf()],
        vec!["txt".to_string()],
    ));
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("test");
        })
        .unwrap();
    assert_eq!(out, "views txt");

    // Without it, the default candidate order picks the html template.
    registry
        .templates_mut()
        .set_environment(StaticViews::new(vec![views.path().to_path_buf()], vec![]));
    let out = registry
        .transform("http://test1.net/foo", |handlers| {
            handlers.any_template("test");
        })
        .unwrap();
    assert_eq!(out, "views html");
}

#[test]
fn xml_backends_extract_equivalent_fields() {
    const RESPONSE: &str = "<?xml version=\"1.0\"?>\n<oembed>\n  <html>bar</html>\n</oembed>\n";

    for excluded in [&[][..], &["roxmltree"][..], &["roxmltree", "quick-xml"][..]] {
        let mut registry = Registry::new();
        let body = Arc::new(Mutex::new(RESPONSE.to_string()));
        registry.load_defaults(excluded);
        registry.register_fetcher(CannedFetcher {
            name: "canned".to_string(),
            body,
        });
        registry
            .register(
                unfurl::RegisterConfig {
                    method: Some("canned".to_string()),
                },
                [("test".to_string(), "http://test/oembed.{format}".to_string())].into(),
                [(
                    "test".to_string(),
                    unfurl::ProviderSpec {
                        format: Some("xml".to_string()),
                        schemes: "http://test.*/*".into(),
                    },
                )]
                .into(),
            )
            .unwrap();

        let out = registry
            .transform("http://test.com/bar/baz", |_handlers| {})
            .unwrap();
        assert_eq!(out, "bar", "excluded: {:?}", excluded);
    }
}
