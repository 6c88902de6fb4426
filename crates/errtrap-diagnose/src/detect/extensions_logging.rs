//! Errtrap.Extensions.Logging: the Microsoft.Extensions.Logging provider,
//! registered in `Program.cs`.
//!
//! The package shares its `AddErrtrap` method name with Errtrap.AspNetCore,
//! so when both packages sit in the same manifest the missing-call message
//! points that out instead of sending the user in circles.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::textscan;
use crate::{keys, versions};

const REGISTRATION: &str = ".AddErrtrap(";
const PROVIDER_USING: &str = "using Errtrap.Extensions.Logging";
const API_KEY_MARKER: &str = ".ApiKey = \"";
const LOG_ID_MARKER: &str = ".LogId = new Guid(\"";

const HINTS: &[&str] = &[
    "Make sure that you are calling the AddErrtrap method when configuring logging in the Program.cs file.",
    "Make sure that a valid API key and log ID are configured in either Program.cs or the appsettings.json file.",
];

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["errtrap.extensions.logging"]);

    let mut api_key: Option<String> = None;
    let mut log_id: Option<String> = None;
    if let Some(program) = cx.read_sibling("Program.cs") {
        if !program.contains(REGISTRATION) || !program.contains(PROVIDER_USING) {
            let message = if cx.packages.contains_key("errtrap.aspnetcore") {
                "A call to AddErrtrap was not found in Program.cs. Both Errtrap.Extensions.Logging and Errtrap.AspNetCore provide a method named AddErrtrap. Make sure to call both if you have both packages installed."
            } else {
                "A call to AddErrtrap was not found in Program.cs."
            };
            cx.error(message);
        }
        api_key = textscan::extract_after(&program, REGISTRATION, API_KEY_MARKER, 32)
            .map(str::to_string);
        log_id = textscan::extract_after(&program, REGISTRATION, LOG_ID_MARKER, 36)
            .map(str::to_string);
    }

    if api_key.is_none() || log_id.is_none() {
        if let Some(settings) = cx.read_sibling("appsettings.json") {
            if api_key.is_none() {
                api_key = textscan::extract_after(&settings, "\"Errtrap\":", "\"ApiKey\": \"", 32)
                    .map(str::to_string);
            }
            if log_id.is_none() {
                log_id = textscan::extract_after(&settings, "\"Errtrap\":", "\"LogId\": \"", 36)
                    .map(str::to_string);
            }
        }
    }

    keys::diagnose_keys(cx, api_key.as_deref(), log_id.as_deref());
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

    fn report_for(
        tree: &ProjectTree,
        packages: &[(&str, Option<&str>)],
        remote: &StubRemote,
    ) -> errtrap_types::DiagnosisReport {
        let manifest = tree.manifest("App.csproj");
        run_detector(
            FamilyId::ExtensionsLogging,
            run,
            &manifest,
            &package_set(packages),
            remote,
            &StubSchemas::offline(),
            false,
        )
    }

    const ONLY_LOGGING: &[(&str, Option<&str>)] =
        &[("errtrap.extensions.logging", Some("5.1.0"))];

    #[test]
    fn configured_provider_reports_nothing() {
        let tree = ProjectTree::new();
        tree.write(
            "Program.cs",
            &format!(
                "using Errtrap.Extensions.Logging;\n\nbuilder.Logging.AddErrtrap(o => {{ o.ApiKey = \"{API_KEY}\"; o.LogId = new Guid(\"{LOG_ID}\"); }});\n"
            ),
        );
        let remote = StubRemote::accepting();
        let report = report_for(&tree, ONLY_LOGGING, &remote);
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.call_count(), 1);
    }

    #[test]
    fn missing_call_without_companion_package() {
        let tree = ProjectTree::new();
        tree.write("Program.cs", "var app = builder.Build();\n");
        let report = report_for(&tree, ONLY_LOGGING, &StubRemote::accepting());
        assert_eq!(
            finding_messages(&report),
            vec!["A call to AddErrtrap was not found in Program.cs."],
        );
    }

    #[test]
    fn missing_call_with_companion_package_explains_the_clash() {
        let tree = ProjectTree::new();
        tree.write("Program.cs", "var app = builder.Build();\n");
        let packages: &[(&str, Option<&str>)] = &[
            ("errtrap.extensions.logging", Some("5.1.0")),
            ("errtrap.aspnetcore", Some("5.3.0")),
        ];
        let report = report_for(&tree, packages, &StubRemote::accepting());
        assert_eq!(report.findings.len(), 1);
        assert!(
            report.findings[0].message.contains("provide a method named AddErrtrap"),
            "{}",
            report.findings[0].message,
        );
    }

    #[test]
    fn missing_using_directive_still_counts_as_missing_setup() {
        let tree = ProjectTree::new();
        tree.write(
            "Program.cs",
            "builder.Logging.AddErrtrap(o => {});\n",
        );
        let report = report_for(&tree, ONLY_LOGGING, &StubRemote::accepting());
        assert_eq!(
            finding_messages(&report),
            vec!["A call to AddErrtrap was not found in Program.cs."],
        );
    }

    #[test]
    fn missing_program_cs_is_tolerated() {
        let tree = ProjectTree::new();
        let report = report_for(&tree, ONLY_LOGGING, &StubRemote::accepting());
        assert!(!report.any_error(), "{:?}", report.findings);
    }

    #[test]
    fn credentials_come_from_appsettings_when_not_inline() {
        let tree = ProjectTree::new();
        tree.write(
            "Program.cs",
            "using Errtrap.Extensions.Logging;\nbuilder.Logging.AddErrtrap();\n",
        );
        tree.write(
            "appsettings.json",
            &format!(
                "{{\n  \"Errtrap\": {{\n    \"ApiKey\": \"{API_KEY}\",\n    \"LogId\": \"{LOG_ID}\"\n  }}\n}}\n"
            ),
        );
        let remote = StubRemote::accepting();
        let report = report_for(&tree, ONLY_LOGGING, &remote);
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.calls.borrow()[0], (API_KEY.to_string(), LOG_ID.to_string()));
    }

    #[test]
    fn hints_are_registered_for_the_family() {
        let tree = ProjectTree::new();
        let report = report_for(&tree, ONLY_LOGGING, &StubRemote::accepting());
        assert_eq!(report.hints[&FamilyId::ExtensionsLogging].len(), 2);
    }
}
