//! Errtrap.NLog: the NLog target.
//!
//! Same candidate files as log4net. The target type is written either as
//! `errtrap` (assembly scan) or `errtrap:errtrap` (explicit prefix), and a
//! dedicated `nlog.config` is schema-validated, which is where the prefixed
//! form matters: the published NLog schema only declares the prefixed type.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::schema::{self, SchemaRef};
use crate::textscan;
use crate::{keys, versions};

const TARGET_PLAIN: &str = "type=\"errtrap\"";
const TARGET_PREFIXED: &str = "type=\"errtrap:errtrap\"";

const SCHEMAS: &[SchemaRef] = &[
    SchemaRef {
        namespace: "http://www.nlog-project.org/schemas/NLog.xsd",
        location: "http://www.nlog-project.org/schemas/NLog.xsd",
    },
    SchemaRef {
        namespace: "http://www.nlog-project.org/schemas/NLog.Targets.Errtrap.xsd",
        location: "http://www.nlog-project.org/schemas/NLog.Targets.Errtrap.xsd",
    },
];

const HINTS: &[&str] = &[
    "Make sure that your nlog.config file is valid and that it declares both the errtrap target and a rule writing to it.",
    "Enable NLog's internal logger on the nlog element and inspect the console for any errors: internalLogLevel=\"Warn\" internalLogToConsole=\"true\".",
];

fn declares_target(content: &str) -> bool {
    textscan::contains_ci(content, "<nlog")
        && textscan::contains_ci(content, "name=\"errtrap\"")
        && (textscan::contains_ci(content, TARGET_PLAIN)
            || textscan::contains_ci(content, TARGET_PREFIXED))
}

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["errtrap.nlog"]);

    let mut config: Option<String> = None;
    for name in ["web.config", "app.config", "nlog.config"] {
        let Some(content) = cx.read_sibling(name) else {
            continue;
        };
        if !declares_target(&content) {
            continue;
        }
        if name == "nlog.config" {
            cx.notice(
                "Validating nlog.config. Any errors may be resolved by changing the target type from errtrap to errtrap:errtrap.",
            );
            schema::validate_against_schemas(cx, name, &content, SCHEMAS);
        }
        config = Some(content);
    }

    if config.is_none() {
        cx.error("NLog configuration for the errtrap target could not be found.");
    }

    match &config {
        Some(content) => {
            let api_key = textscan::extract_after(content, TARGET_PLAIN, " apiKey=\"", 32)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| textscan::extract_after(content, TARGET_PREFIXED, " apiKey=\"", 32));
            let log_id = textscan::extract_after(content, TARGET_PLAIN, " logId=\"", 36)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| textscan::extract_after(content, TARGET_PREFIXED, " logId=\"", 36));
            keys::diagnose_keys(cx, api_key, log_id);
        }
        None => cx.note("No file content found for NLog"),
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

    fn target_config(target_type: &str) -> String {
        format!(
            r#"<nlog xmlns="http://www.nlog-project.org/schemas/NLog.xsd">
  <targets>
    <target name="errtrap" type="{target_type}" apiKey="{API_KEY}" logId="{LOG_ID}" />
  </targets>
  <rules>
    <logger minlevel="Warn" writeTo="errtrap" />
  </rules>
</nlog>
"#
        )
    }

    const NLOG_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="nlog"/>
  <xs:element name="targets"/>
  <xs:element name="target"/>
  <xs:element name="rules"/>
  <xs:element name="logger"/>
  <xs:attribute name="name"/>
  <xs:attribute name="type"/>
  <xs:attribute name="apiKey"/>
  <xs:attribute name="logId"/>
  <xs:attribute name="minlevel"/>
  <xs:attribute name="writeTo"/>
</xs:schema>"#;

    fn nlog_schemas() -> StubSchemas {
        StubSchemas::offline()
            .with("http://www.nlog-project.org/schemas/NLog.xsd", NLOG_XSD)
            .with(
                "http://www.nlog-project.org/schemas/NLog.Targets.Errtrap.xsd",
                "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\"/>",
            )
    }

    fn report_for(
        tree: &ProjectTree,
        remote: &StubRemote,
        schemas: &StubSchemas,
    ) -> errtrap_types::DiagnosisReport {
        let manifest = tree.manifest("App.csproj");
        let packages = package_set(&[("errtrap.nlog", Some("5.1.0"))]);
        run_detector(FamilyId::NLog, run, &manifest, &packages, remote, schemas, false)
    }

    #[test]
    fn target_in_nlog_config_reports_nothing() {
        let tree = ProjectTree::new();
        tree.write("nlog.config", &target_config("errtrap"));
        let remote = StubRemote::accepting();
        let report = report_for(&tree, &remote, &nlog_schemas());
        assert!(!report.any_error(), "{:?}", report.findings);
        assert_eq!(remote.calls.borrow()[0], (API_KEY.to_string(), LOG_ID.to_string()));
    }

    #[test]
    fn validating_a_dedicated_config_leaves_a_notice() {
        let tree = ProjectTree::new();
        tree.write("nlog.config", &target_config("errtrap"));
        let report = report_for(&tree, &StubRemote::accepting(), &nlog_schemas());
        assert!(
            report.notes.iter().any(|n| n.starts_with("Validating nlog.config.")),
            "{:?}",
            report.notes,
        );
    }

    #[test]
    fn prefixed_target_type_is_recognized() {
        let tree = ProjectTree::new();
        tree.write("app.config", &target_config("errtrap:errtrap"));
        let remote = StubRemote::accepting();
        let report = report_for(&tree, &remote, &StubSchemas::offline());
        assert!(!report.any_error(), "{:?}", report.findings);
        // Credentials sit on the prefixed type, found through the fallback anchor.
        assert_eq!(remote.calls.borrow()[0], (API_KEY.to_string(), LOG_ID.to_string()));
    }

    #[test]
    fn missing_target_is_one_finding() {
        let tree = ProjectTree::new();
        tree.write("nlog.config", "<nlog><targets></targets></nlog>");
        let report = report_for(&tree, &StubRemote::accepting(), &nlog_schemas());
        assert_eq!(
            finding_messages(&report),
            vec!["NLog configuration for the errtrap target could not be found."],
        );
    }

    #[test]
    fn misspelled_attribute_in_nlog_config_is_flagged() {
        let tree = ProjectTree::new();
        tree.write(
            "nlog.config",
            &target_config("errtrap").replace("writeTo=", "wrteTo="),
        );
        let report = report_for(&tree, &StubRemote::accepting(), &nlog_schemas());
        assert_eq!(
            finding_messages(&report),
            vec!["Error in nlog.config: The 'wrteTo' attribute is not declared."],
        );
    }

    #[test]
    fn hints_are_registered_for_the_family() {
        let tree = ProjectTree::new();
        let report = report_for(&tree, &StubRemote::accepting(), &StubSchemas::offline());
        assert_eq!(report.hints[&FamilyId::NLog].len(), 2);
    }
}
