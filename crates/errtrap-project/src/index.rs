use crate::model::{Manifest, ManifestKind, PackageSet};
use anyhow::{bail, Context};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Package names are kept only when they start with this prefix...
pub const TOOL_PACKAGE_PREFIX: &str = "errtrap";
/// ...or exactly match the one external integration package.
pub const SERILOG_SINK_PACKAGE: &str = "serilog.sinks.errtrap";

/// Index the recognized packages declared by `manifest`.
///
/// Names are matched case-insensitively and stored lowercased. A package
/// declared twice keeps its last occurrence. Errors (unreadable file,
/// malformed XML) are scoped to this manifest; the caller decides whether the
/// run continues.
pub fn index_packages(manifest: &Manifest) -> anyhow::Result<PackageSet> {
    let text = std::fs::read_to_string(&manifest.path)
        .with_context(|| format!("read {}", manifest.path))?;
    match manifest.kind {
        ManifestKind::Project => index_project(&text),
        ManifestKind::PackagesConfig => index_packages_config(&text),
    }
    .with_context(|| format!("parse {}", manifest.path))
}

/// `Project/ItemGroup/PackageReference` elements, `Include`/`Version`
/// attributes. Only direct ItemGroup children of the root count, matching
/// how the manifests are laid out in practice; conditional `Choose` blocks
/// are ignored.
pub(crate) fn index_project(xml: &str) -> anyhow::Result<PackageSet> {
    let mut reader = Reader::from_str(xml);
    let mut packages = PackageSet::new();
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = lower_local_name(&e);
                if name == "packagereference" && at_item_group(&stack) {
                    record_package(&e, "Include", "Version", &mut packages)?;
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = lower_local_name(&e);
                if name == "packagereference" && at_item_group(&stack) {
                    record_package(&e, "Include", "Version", &mut packages)?;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("malformed XML: {e}"),
            Ok(_) => {}
        }
    }

    Ok(packages)
}

/// `packages/package` elements, `id`/`version` attributes, same name filter.
pub(crate) fn index_packages_config(xml: &str) -> anyhow::Result<PackageSet> {
    let mut reader = Reader::from_str(xml);
    let mut packages = PackageSet::new();
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = lower_local_name(&e);
                if name == "package" && stack == ["packages"] {
                    record_package(&e, "id", "version", &mut packages)?;
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = lower_local_name(&e);
                if name == "package" && stack == ["packages"] {
                    record_package(&e, "id", "version", &mut packages)?;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("malformed XML: {e}"),
            Ok(_) => {}
        }
    }

    Ok(packages)
}

fn recognized(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with(TOOL_PACKAGE_PREFIX) || lower == SERILOG_SINK_PACKAGE
}

fn lower_local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

fn at_item_group(stack: &[String]) -> bool {
    stack.len() == 2 && stack[0] == "project" && stack[1] == "itemgroup"
}

fn record_package(
    e: &BytesStart<'_>,
    name_attr: &str,
    version_attr: &str,
    packages: &mut PackageSet,
) -> anyhow::Result<()> {
    let mut name: Option<String> = None;
    let mut version: Option<String> = None;

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        if key == name_attr {
            name = Some(attr.unescape_value()?.into_owned());
        } else if key == version_attr {
            version = Some(attr.unescape_value()?.into_owned());
        }
    }

    if let Some(name) = name {
        if recognized(&name) {
            packages.insert(name.to_ascii_lowercase(), version);
        }
    }

    Ok(())
}
