//! Structural XML schema validation.
//!
//! This is not a conforming XSD processor. The schemas the detectors care
//! about (log4net, NLog) are flat vocabularies, and the mistakes worth
//! catching are misspelled elements and attributes, so the validator
//! collects every `xs:element`/`xs:attribute` name the schemas declare and
//! flags document names outside that set. Names compare case-insensitively;
//! content models and types are not checked.
//!
//! Schema loading is best effort. A schema that cannot be fetched or parsed
//! downgrades to a verbose note so a network outage never fails a diagnosis.

use std::collections::BTreeSet;
use std::fs;

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::detect::DetectorRun;

/// Target namespace and location of one schema document. Locations are URLs
/// or local paths.
pub(crate) struct SchemaRef {
    pub namespace: &'static str,
    pub location: &'static str,
}

#[derive(Default)]
struct Vocabulary {
    elements: BTreeSet<String>,
    attributes: BTreeSet<String>,
}

/// Validates `content` against the merged vocabulary of `schemas`, reporting
/// one finding per undeclared name prefixed with `Error in {file_name}:`.
pub(crate) fn validate_against_schemas(
    cx: &mut DetectorRun<'_>,
    file_name: &str,
    content: &str,
    schemas: &[SchemaRef],
) {
    if content.trim().is_empty() {
        cx.note("Missing file content when validating against XML schema");
        return;
    }

    let mut vocabulary = Vocabulary::default();
    let mut loaded = 0usize;
    for schema in schemas {
        let source = if schema.location.starts_with("http://") || schema.location.starts_with("https://") {
            cx.schemas.fetch(schema.location)
        } else {
            fs::read_to_string(schema.location).map_err(Into::into)
        };
        match source.and_then(|xsd| collect_vocabulary(&mut vocabulary, &xsd)) {
            Ok(()) => loaded += 1,
            Err(e) => cx.note(format!(
                "Unable to load schema for namespace '{}' from {}: {e:#}",
                schema.namespace, schema.location
            )),
        }
    }
    if loaded == 0 {
        return;
    }

    let (problems, parse_error) = undeclared_names(content, &vocabulary);
    for problem in problems {
        cx.error(format!("Error in {file_name}: {problem}"));
    }
    if let Some(message) = parse_error {
        cx.note(message);
    }
}

/// Pulls every named `xs:element` and `xs:attribute` out of a schema
/// document, at any nesting depth. `ref`-only declarations contribute
/// nothing.
fn collect_vocabulary(vocabulary: &mut Vocabulary, xsd: &str) -> Result<()> {
    let mut reader = Reader::from_str(xsd);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let declares = match e.local_name().as_ref() {
                    b"element" => Some(true),
                    b"attribute" => Some(false),
                    _ => None,
                };
                let Some(is_element) = declares else { continue };
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() != b"name" {
                        continue;
                    }
                    let name = attr.unescape_value()?.to_ascii_lowercase();
                    if is_element {
                        vocabulary.elements.insert(name);
                    } else {
                        vocabulary.attributes.insert(name);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => bail!("malformed schema: {e}"),
        }
    }
    Ok(())
}

/// Walks the document and collects undeclared element and attribute names.
/// Attributes of an undeclared element are not reported separately. The
/// second value carries a parse error when the walk could not finish;
/// problems found up to that point are still returned.
fn undeclared_names(content: &str, vocabulary: &Vocabulary) -> (Vec<String>, Option<String>) {
    let mut problems = Vec::new();
    let mut reader = Reader::from_str(content);
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return (problems, Some(format!("malformed XML: {e}"))),
        };
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !vocabulary.elements.contains(&element.to_ascii_lowercase()) {
                    problems.push(format!("The '{element}' element is not declared."));
                    continue;
                }
                for attr in e.attributes() {
                    let attr = match attr {
                        Ok(attr) => attr,
                        Err(e) => return (problems, Some(format!("malformed XML: {e}"))),
                    };
                    let raw = attr.key.as_ref();
                    if raw.starts_with(b"xmlns") || raw.starts_with(b"xml:") || raw.starts_with(b"xsi:") {
                        continue;
                    }
                    let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                    if !vocabulary.attributes.contains(&name.to_ascii_lowercase()) {
                        problems.push(format!("The '{name}' attribute is not declared."));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    (problems, None)
}
