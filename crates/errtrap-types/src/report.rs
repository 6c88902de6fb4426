use crate::{FamilyId, ProjectPath};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable schema identifier for the diagnosis report.
pub const SCHEMA_DIAGNOSIS_V1: &str = "errtrap.diagnosis.v1";

/// A single reported problem. There is only one severity: any finding makes
/// the run unsuccessful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    /// Family that produced the finding; absent for engine-level problems
    /// such as an unreadable manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<FamilyId>,

    /// Manifest under diagnosis when the finding fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ProjectPath>,

    pub message: String,
}

/// A detector that fired for a manifest, in dispatch order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    pub family: FamilyId,
    pub manifest: ProjectPath,
}

/// Everything one diagnosis run produced. Built fresh per invocation, mutated
/// only by the engine thread, handed to the reporter when the run is done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosisReport {
    pub schema: String,
    pub root: ProjectPath,
    pub manifests_scanned: u32,

    /// True when the walk found no project or packages files at all.
    pub nothing_to_scan: bool,

    pub detections: Vec<Detection>,
    pub findings: Vec<Finding>,

    /// Informational notices plus, under verbose runs, extra diagnostics.
    /// Notes never fail the run.
    pub notes: Vec<String>,

    /// Remediation hints keyed by family, registered at most once per run.
    pub hints: BTreeMap<FamilyId, Vec<String>>,
}

impl DiagnosisReport {
    pub fn new(root: ProjectPath) -> Self {
        Self {
            schema: SCHEMA_DIAGNOSIS_V1.to_string(),
            root,
            manifests_scanned: 0,
            nothing_to_scan: false,
            detections: Vec::new(),
            findings: Vec::new(),
            notes: Vec::new(),
            hints: BTreeMap::new(),
        }
    }

    pub fn any_error(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn detection(&mut self, family: FamilyId, manifest: ProjectPath) {
        self.detections.push(Detection { family, manifest });
    }

    pub fn error(
        &mut self,
        family: Option<FamilyId>,
        manifest: Option<ProjectPath>,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding {
            family,
            manifest,
            message: message.into(),
        });
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Register a family's hints; later registrations for the same family are
    /// ignored so hints appear once per run.
    pub fn hint_once(&mut self, family: FamilyId, hints: &[&str]) {
        self.hints
            .entry(family)
            .or_insert_with(|| hints.iter().map(|h| h.to_string()).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> DiagnosisReport {
        DiagnosisReport::new(ProjectPath::new("/work/app"))
    }

    #[test]
    fn fresh_report_has_no_errors() {
        let r = report();
        assert!(!r.any_error());
        assert_eq!(r.schema, SCHEMA_DIAGNOSIS_V1);
    }

    #[test]
    fn any_finding_marks_the_run_failed() {
        let mut r = report();
        r.note("just a note");
        assert!(!r.any_error());
        r.error(None, None, "broken");
        assert!(r.any_error());
    }

    #[test]
    fn hint_once_keeps_first_registration() {
        let mut r = report();
        r.hint_once(FamilyId::Classic, &["first"]);
        r.hint_once(FamilyId::Classic, &["second"]);
        assert_eq!(r.hints[&FamilyId::Classic], vec!["first".to_string()]);
        assert_eq!(r.hints.len(), 1);
    }

    #[test]
    fn hints_iterate_in_dispatch_order() {
        let mut r = report();
        r.hint_once(FamilyId::Serilog, &["s"]);
        r.hint_once(FamilyId::AspNetCore, &["a"]);
        let keys: Vec<FamilyId> = r.hints.keys().copied().collect();
        assert_eq!(keys, vec![FamilyId::AspNetCore, FamilyId::Serilog]);
    }

    #[test]
    fn report_round_trips_through_json() {
        let mut r = report();
        r.detection(FamilyId::NLog, ProjectPath::new("/work/app/App.csproj"));
        r.error(
            Some(FamilyId::NLog),
            Some(ProjectPath::new("/work/app/App.csproj")),
            "NLog configuration for the errtrap target could not be found.",
        );
        let json = serde_json::to_string(&r).unwrap();
        let back: DiagnosisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
