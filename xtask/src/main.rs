//! Developer tasks (schema generation, report conformance).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            std::env::current_dir().expect("Cannot determine current directory")
        });

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .expect("xtask has no parent")
            .to_path_buf()
    } else {
        manifest_dir
    }
}

/// Get the schemas directory path.
fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

/// Generate the diagnosis report schema.
fn generate_diagnosis_schema() -> schemars::Schema {
    schema_for!(errtrap_types::DiagnosisReport)
}

/// List of schemas to generate.
fn schema_specs() -> Vec<SchemaSpec> {
    vec![SchemaSpec {
        filename: "errtrap.diagnosis.v1.json",
        generate: generate_diagnosis_schema,
    }]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

/// Emit schemas to the schemas/ directory.
fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create schemas directory")?;
    }

    for spec in schema_specs() {
        let schema = (spec.generate)();
        let json = serialize_schema(&schema)?;
        let path = dir.join(spec.filename);

        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;

        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);

        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let schema = (spec.generate)();
        let expected = serialize_schema(&schema)?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        Ok(())
    } else {
        if !missing.is_empty() {
            eprintln!("Missing schemas:");
            for name in &missing {
                eprintln!("  - {}", name);
            }
        }
        if !mismatched.is_empty() {
            eprintln!("Schemas out of date:");
            for name in &mismatched {
                eprintln!("  - {}", name);
            }
        }
        eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
        bail!("Schema validation failed")
    }
}

/// Run the built errtrap binary over the diagnose fixtures and validate every
/// JSON report against the generated diagnosis schema.
fn conform() -> anyhow::Result<()> {
    let schema = generate_diagnosis_schema();
    let schema_value = serde_json::to_value(&schema).context("Failed to serialize schema")?;
    let compiled = jsonschema::validator_for(&schema_value)
        .map_err(|e| anyhow::anyhow!("Failed to compile schema: {}", e))?;

    println!("✓ errtrap.diagnosis.v1 schema compiles");

    let errtrap_bin = project_root().join("target").join("debug").join("errtrap");

    #[cfg(target_os = "windows")]
    let errtrap_bin = errtrap_bin.with_extension("exe");

    if !errtrap_bin.exists() {
        bail!(
            "errtrap binary not found at {}.\n\
            Run `cargo build -p errtrap-cli` first.",
            errtrap_bin.display()
        );
    }

    let fixtures_dir = project_root().join("tests").join("fixtures");
    let mut fixture_count = 0;
    let mut errors = Vec::new();

    for entry in fs::read_dir(&fixtures_dir).context("Failed to read tests/fixtures/")? {
        let entry = entry?;
        let fixture_dir = entry.path();
        if !fixture_dir.is_dir() {
            continue;
        }

        let fixture_name = fixture_dir
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let output = std::process::Command::new(&errtrap_bin)
            .args([
                "diagnose",
                "--directory",
                fixture_dir.to_str().unwrap_or_default(),
                "--format",
                "json",
            ])
            .output()
            .with_context(|| format!("Failed to run errtrap on fixture '{}'", fixture_name))?;

        if !output.status.success() {
            errors.push(format!(
                "fixture '{}': errtrap exited with {:?}: {}",
                fixture_name,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ));
            continue;
        }

        let report_value: serde_json::Value = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Failed to parse report for fixture '{}'", fixture_name))?;

        for err in compiled.iter_errors(&report_value) {
            errors.push(format!(
                "fixture '{}': schema validation: {}",
                fixture_name, err
            ));
        }

        fixture_count += 1;
        println!("  ✓ fixture '{}' produces a valid diagnosis report", fixture_name);
    }

    if fixture_count == 0 {
        bail!("No fixture trees found in {}", fixtures_dir.display());
    }

    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {}", err);
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {} fixture reports pass conformance checks!", fixture_count);
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate fixture diagnose reports against the schema");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                let name = spec.filename.trim_end_matches(".json");
                println!("{}", name);
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
