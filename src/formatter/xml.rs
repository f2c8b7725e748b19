//! XML format support.
//!
//! Three backends compete for the "xml" format. All of them extract the
//! direct child elements of the response's root element (conventionally
//! `<oembed>`) into a flat field mapping with the same typing rules, so
//! swapping backends via `load_defaults` exclusions never changes the
//! extracted fields.

use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::value::Value;
use std::collections::HashMap;

/// Type a field's text content: integer, then float, else string.
fn typed_text(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(text.to_string())
}

fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Parse {
        format: "xml".to_string(),
        source: Box::new(source),
    }
}

/// Formatter for XML oEmbed responses, backed by roxmltree.
pub struct RoXmlFormatter;

impl Formatter for RoXmlFormatter {
    fn parse(&self, raw: &str) -> Result<Value> {
        let doc = roxmltree::Document::parse(raw).map_err(parse_error)?;

        let mut fields = HashMap::new();
        for child in doc.root_element().children() {
            if child.is_element() {
                let text = child.text().unwrap_or("").trim();
                fields.insert(child.tag_name().name().to_string(), typed_text(text));
            }
        }
        Ok(Value::Object(fields))
    }

    fn format(&self) -> &str {
        "xml"
    }

    fn name(&self) -> &str {
        "roxmltree"
    }
}

/// Formatter for XML oEmbed responses, backed by quick-xml's pull parser.
pub struct QuickXmlFormatter;

impl Formatter for QuickXmlFormatter {
    fn parse(&self, raw: &str) -> Result<Value> {
        use quick_xml::events::Event;

        let mut reader = quick_xml::Reader::from_str(raw);
        reader.trim_text(true);

        let mut fields = HashMap::new();
        let mut depth = 0usize;
        let mut current: Option<String> = None;
        let mut text = String::new();

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(start) => {
                    depth += 1;
                    if depth == 2 {
                        let name = start.local_name();
                        current = Some(String::from_utf8_lossy(name.as_ref()).into_owned());
                        text.clear();
                    }
                }
                Event::Empty(start) => {
                    if depth == 1 {
                        let name = start.local_name();
                        fields.insert(
                            String::from_utf8_lossy(name.as_ref()).into_owned(),
                            Value::String(String::new()),
                        );
                    }
                }
                Event::Text(t) => {
                    if depth == 2 {
                        text.push_str(&t.unescape().map_err(parse_error)?);
                    }
                }
                Event::End(_) => {
                    if depth == 2 {
                        if let Some(field) = current.take() {
                            fields.insert(field, typed_text(text.trim()));
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Value::Object(fields))
    }

    fn format(&self) -> &str {
        "xml"
    }

    fn name(&self) -> &str {
        "quick-xml"
    }
}

/// In-process XML scanner, used when every preferred backend is excluded.
///
/// Handles the flat element-per-field shape of oEmbed responses: a root
/// element whose direct children each carry text content. Attributes are
/// skipped; the five predefined entities are unescaped. Not a general XML
/// parser.
pub struct ScanXmlFormatter;

impl Formatter for ScanXmlFormatter {
    fn parse(&self, raw: &str) -> Result<Value> {
        scan_fields(raw)
            .map(Value::Object)
            .map_err(|message| Error::Parse {
                format: "xml".to_string(),
                source: message.into(),
            })
    }

    fn format(&self) -> &str {
        "xml"
    }

    fn name(&self) -> &str {
        "xmlscan"
    }
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Read a tag at `input[pos..]` (which must start with '<').
///
/// Returns the element name, the position just past '>', and whether the
/// tag was self-closing.
fn read_tag(input: &str, pos: usize) -> std::result::Result<(String, usize, bool), String> {
    let close = input[pos..]
        .find('>')
        .map(|i| pos + i)
        .ok_or_else(|| format!("unterminated tag at offset {}", pos))?;
    let inner = input[pos + 1..close].trim();
    let self_closing = inner.ends_with('/');
    let inner = inner.trim_end_matches('/').trim();
    let name = inner
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("empty tag at offset {}", pos))?;
    Ok((name.to_string(), close + 1, self_closing))
}

fn scan_fields(raw: &str) -> std::result::Result<HashMap<String, Value>, String> {
    let mut rest = raw.trim();

    // Skip the XML declaration and any comments before the root element.
    loop {
        if let Some(stripped) = rest.strip_prefix("<?") {
            let end = stripped.find("?>").ok_or("unterminated XML declaration")?;
            rest = stripped[end + 2..].trim_start();
        } else if let Some(stripped) = rest.strip_prefix("<!--") {
            let end = stripped.find("-->").ok_or("unterminated comment")?;
            rest = stripped[end + 3..].trim_start();
        } else {
            break;
        }
    }

    if !rest.starts_with('<') {
        return Err("no root element".to_string());
    }
    let (root, mut pos, self_closing) = read_tag(rest, 0)?;
    let mut fields = HashMap::new();
    if self_closing {
        return Ok(fields);
    }

    loop {
        // Skip text between child elements.
        let next = rest[pos..]
            .find('<')
            .map(|i| pos + i)
            .ok_or_else(|| format!("missing closing tag for root '{}'", root))?;
        if rest[next..].starts_with("</") {
            let (end_name, _, _) = read_tag(rest, next + 1)?;
            if end_name == root {
                return Ok(fields);
            }
            return Err(format!("unexpected closing tag '{}'", end_name));
        }

        let (name, body_start, self_closing) = read_tag(rest, next)?;
        if self_closing {
            fields.insert(name, Value::String(String::new()));
            pos = body_start;
            continue;
        }

        let end_tag = format!("</{}>", name);
        let body_end = rest[body_start..]
            .find(&end_tag)
            .map(|i| body_start + i)
            .ok_or_else(|| format!("missing closing tag for '{}'", name))?;
        let text = unescape_entities(rest[body_start..body_end].trim());
        fields.insert(name, typed_text(&text));
        pos = body_end + end_tag.len();
    }
}
