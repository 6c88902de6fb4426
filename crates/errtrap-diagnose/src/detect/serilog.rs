//! Serilog.Sinks.Errtrap: the Serilog sink.
//!
//! Serilog pipelines are built in code, anywhere in the project, so this is
//! the one detector that walks source files instead of probing conventional
//! names. The first file wiring `.Errtrap(` into a LoggerConfiguration is
//! taken as the configuration source.

use std::fs;

use anyhow::Result;
use errtrap_project::locate_source_files;

use crate::detect::DetectorRun;
use crate::textscan;
use crate::{keys, versions};

const SINK_CALL: &str = ".Errtrap(";

const HINTS: &[&str] = &[
    "Make sure that you are calling the Errtrap method as part of building the LoggerConfiguration and that it receives both a valid API key and log ID.",
    "Make sure that the serilog.sinks.errtrap NuGet package is installed in the latest stable version.",
];

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["serilog.sinks.errtrap"]);

    let mut found = false;
    for file in locate_source_files(cx.manifest.dir())? {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        if !content.contains(SINK_CALL) {
            continue;
        }
        found = true;
        let api_key = textscan::extract_after(&content, SINK_CALL, "ErrtrapSinkOptions(\"", 32);
        let log_id = textscan::extract_after(&content, SINK_CALL, ", new Guid(\"", 36);
        keys::diagnose_keys(cx, api_key, log_id);
        break;
    }

    if !found {
        cx.error("Serilog configuration for the errtrap sink could not be found.");
    }

    cx.hint_once(HINTS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use errtrap_types::FamilyId;

    use super::*;
    use crate::test_support::{
        API_KEY, LOG_ID, ProjectTree, StubRemote, StubSchemas, finding_messages, package_set,
        run_detector,
    };

    fn sink_setup() -> String {
        format!(
            "var logger = new LoggerConfiguration()\n    .WriteTo.Errtrap(new ErrtrapSinkOptions(\"{API_KEY}\", new Guid(\"{LOG_ID}\")))\n    .CreateLogger();\n"
        )
    }

    fn report_for(tree: &ProjectTree, remote: &StubRemote) -> errtrap_types::DiagnosisReport {
        let manifest = tree.manifest("App.csproj");
        let packages = package_set(&[("serilog.sinks.errtrap", Some("5.0.0"))]);
        run_detector(
            FamilyId::Serilog,
            run,
            &manifest,
            &packages,
            remote,
            &StubSchemas::offline(),
            false,
        )
    }

    #[test]
    fn sink_configured_in_any_source_file_reports_nothing() {
        let tree = ProjectTree::new();
        tree.write("Setup/Logging.cs", &sink_setup());
        let remote = StubRemote::accepting();
        let report = report_for(&tree, &remote);
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.calls.borrow()[0], (API_KEY.to_string(), LOG_ID.to_string()));
    }

    #[test]
    fn missing_sink_call_is_one_finding() {
        let tree = ProjectTree::new();
        tree.write("Program.cs", "var logger = new LoggerConfiguration().CreateLogger();\n");
        let report = report_for(&tree, &StubRemote::accepting());
        assert_eq!(
            finding_messages(&report),
            vec!["Serilog configuration for the errtrap sink could not be found."],
        );
    }

    #[test]
    fn scanning_stops_at_the_first_configuring_file() {
        let tree = ProjectTree::new();
        // Sorted walk order: A.cs before B.cs; only A.cs should be consulted.
        tree.write("A.cs", &sink_setup());
        tree.write(
            "B.cs",
            &sink_setup().replace(API_KEY, &"f".repeat(32)),
        );
        let remote = StubRemote::accepting();
        let report = report_for(&tree, &remote);
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.call_count(), 1);
        assert_eq!(remote.calls.borrow()[0].0, API_KEY.to_string());
    }

    #[test]
    fn generated_code_under_obj_is_ignored() {
        let tree = ProjectTree::new();
        tree.write("obj/Generated.cs", &sink_setup());
        let report = report_for(&tree, &StubRemote::accepting());
        assert_eq!(
            finding_messages(&report),
            vec!["Serilog configuration for the errtrap sink could not be found."],
        );
    }

    #[test]
    fn sink_without_inline_credentials_is_found_but_keys_are_missing() {
        let tree = ProjectTree::new();
        tree.write(
            "Program.cs",
            "var logger = new LoggerConfiguration().WriteTo.Errtrap(options).CreateLogger();\n",
        );
        let remote = StubRemote::accepting();
        let report = report_for(&tree, &remote);
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.call_count(), 0);
    }

    #[test]
    fn hints_are_registered_for_the_family() {
        let tree = ProjectTree::new();
        let report = report_for(&tree, &StubRemote::accepting());
        assert_eq!(report.hints[&FamilyId::Serilog].len(), 2);
    }
}
