//! The diagnosis run: locate manifests, index packages, dispatch detectors.
//!
//! Every failure below the walk itself is local. A manifest that cannot be
//! indexed costs one finding and the run moves to the next manifest; a
//! detector that returns an error costs one finding and the run moves to the
//! next detector. The report is always produced.

use camino::Utf8Path;
use errtrap_project::{index_packages, locate_manifests};
use errtrap_types::{DiagnosisReport, ProjectPath};

use crate::detect::{DETECTORS, DetectorRun};
use crate::remote::{RemoteValidator, SchemaFetcher};

/// Diagnoses the project tree under `root` and returns the full report.
pub fn run_diagnosis(
    root: &Utf8Path,
    verbose: bool,
    remote: &dyn RemoteValidator,
    schemas: &dyn SchemaFetcher,
) -> DiagnosisReport {
    let mut report = DiagnosisReport::new(ProjectPath::from(root));

    let manifests = match locate_manifests(root) {
        Ok(manifests) => manifests,
        Err(e) => {
            report.error(None, None, format!("Could not scan {root}: {e:#}"));
            return report;
        }
    };
    report.manifests_scanned = manifests.len() as u32;
    if manifests.is_empty() {
        report.nothing_to_scan = true;
        return report;
    }

    for manifest in &manifests {
        let manifest_path = ProjectPath::from(manifest.path.as_path());
        let packages = match index_packages(manifest) {
            Ok(packages) => packages,
            Err(e) => {
                report.error(None, Some(manifest_path), format!("{e:#}"));
                continue;
            }
        };
        if verbose {
            if packages.is_empty() {
                report.note(format!("No packages found in {}", manifest.path));
            } else {
                let names: Vec<&str> = packages.keys().map(String::as_str).collect();
                report.note(format!(
                    "Found the following packages in {}: {}",
                    manifest.path,
                    names.join(", ")
                ));
            }
        }

        for detector in DETECTORS {
            if !detector.triggered_by(&packages) {
                continue;
            }
            report.detection(detector.family, manifest_path.clone());
            let outcome = {
                let mut cx = DetectorRun {
                    manifest,
                    packages: &packages,
                    report: &mut report,
                    remote,
                    schemas,
                    family: detector.family,
                    verbose,
                };
                (detector.run)(&mut cx)
            };
            if let Err(e) = outcome {
                report.error(
                    Some(detector.family),
                    Some(manifest_path.clone()),
                    format!("Diagnosis of {} failed: {e:#}", detector.family),
                );
            }
        }
    }

    report
}
