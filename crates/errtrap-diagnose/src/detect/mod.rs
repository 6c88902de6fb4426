//! Detector registry.
//!
//! One module per integration family. Every detector follows the same steps:
//! package version check, config discovery, config inspection, credential
//! extraction, credential validation, and family hints. What differs is which
//! files are inspected and which literals anchor the extraction, so each
//! module is mostly tables and messages around the shared helpers.
//!
//! Detectors write into the report through [`DetectorRun`] and are listed in
//! [`DETECTORS`] in dispatch order.

use std::fs;

use anyhow::Result;
use errtrap_project::{Manifest, PackageSet};
use errtrap_types::{DiagnosisReport, FamilyId, ProjectPath};

use crate::remote::{RemoteValidator, SchemaFetcher};

mod aspnetcore;
mod classic;
mod extensions_logging;
mod functions;
mod log4net;
mod nlog;
mod serilog;

/// Everything a detector may touch while examining one manifest.
pub(crate) struct DetectorRun<'a> {
    pub manifest: &'a Manifest,
    pub packages: &'a PackageSet,
    pub report: &'a mut DiagnosisReport,
    pub remote: &'a dyn RemoteValidator,
    pub schemas: &'a dyn SchemaFetcher,
    pub family: FamilyId,
    pub verbose: bool,
}

impl DetectorRun<'_> {
    /// Records a finding attributed to the current family and manifest.
    pub fn error(&mut self, message: impl Into<String>) {
        let manifest = ProjectPath::from(self.manifest.path.as_path());
        self.report.error(Some(self.family), Some(manifest), message);
    }

    /// Records a note, but only when running verbose.
    pub fn note(&mut self, message: impl Into<String>) {
        if self.verbose {
            self.report.note(message);
        }
    }

    /// Records a note regardless of verbosity.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.report.note(message);
    }

    /// Registers the family hint block. Repeated calls are no-ops.
    pub fn hint_once(&mut self, hints: &[&str]) {
        self.report.hint_once(self.family, hints);
    }

    /// Content of `name` next to the manifest, when present and readable.
    pub fn read_sibling(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.manifest.sibling(name)).ok()
    }
}

type DetectorFn = fn(&mut DetectorRun<'_>) -> Result<()>;

pub(crate) struct Detector {
    pub family: FamilyId,
    /// Lowercased package names that make this detector run.
    pub triggers: &'static [&'static str],
    pub run: DetectorFn,
}

impl Detector {
    pub fn triggered_by(&self, packages: &PackageSet) -> bool {
        self.triggers.iter().any(|name| packages.contains_key(*name))
    }
}

/// Registry in dispatch order. Adding a family means adding a module and one
/// row here.
pub(crate) const DETECTORS: &[Detector] = &[
    Detector {
        family: FamilyId::AspNetCore,
        triggers: &["errtrap.aspnetcore"],
        run: aspnetcore::run,
    },
    Detector {
        family: FamilyId::ExtensionsLogging,
        triggers: &["errtrap.extensions.logging"],
        run: extensions_logging::run,
    },
    Detector {
        family: FamilyId::Classic,
        triggers: &["errtrap", "errtrap.aspnet", "errtrap.mvc", "errtrap.webapi"],
        run: classic::run,
    },
    Detector {
        family: FamilyId::Log4Net,
        triggers: &["errtrap.log4net"],
        run: log4net::run,
    },
    Detector {
        family: FamilyId::NLog,
        triggers: &["errtrap.nlog"],
        run: nlog::run,
    },
    Detector {
        family: FamilyId::Serilog,
        triggers: &["serilog.sinks.errtrap"],
        run: serilog::run,
    },
    Detector {
        family: FamilyId::Functions,
        triggers: &["errtrap.functions"],
        run: functions::run,
    },
];

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn registry_covers_every_family_in_dispatch_order() {
        let families: Vec<FamilyId> = DETECTORS.iter().map(|d| d.family).collect();
        assert_eq!(families, FamilyId::ALL.to_vec());
    }

    #[test]
    fn triggers_are_lowercase_and_unique() {
        let mut seen = BTreeSet::new();
        for detector in DETECTORS {
            assert!(!detector.triggers.is_empty());
            for name in detector.triggers {
                assert_eq!(*name, name.to_lowercase().as_str());
                assert!(seen.insert(*name), "duplicate trigger {name}");
            }
        }
    }

    #[test]
    fn triggered_by_matches_on_any_trigger() {
        let detector = &DETECTORS[2];
        let mut packages = PackageSet::new();
        assert!(!detector.triggered_by(&packages));
        packages.insert("errtrap.mvc".to_string(), Some("5.0.0".to_string()));
        assert!(detector.triggered_by(&packages));
    }
}
