//! Shared fixtures for detector and engine tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;

use anyhow::{Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use errtrap_project::{Manifest, ManifestKind, PackageSet};
use errtrap_types::{DiagnosisReport, FamilyId, ProjectPath};
use tempfile::TempDir;

use crate::detect::DetectorRun;
use crate::remote::{RemoteValidator, SchemaFetcher};

/// A throwaway project directory populated file by file.
pub(crate) struct ProjectTree {
    tmp: TempDir,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.tmp.path().to_path_buf()).unwrap()
    }

    pub fn write(&self, rel: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// A project manifest handle rooted in this tree. The file itself does
    /// not have to exist for detector tests.
    pub fn manifest(&self, rel: &str) -> Manifest {
        Manifest {
            path: self.root().join(rel),
            kind: ManifestKind::Project,
        }
    }
}

pub(crate) fn package_set(entries: &[(&str, Option<&str>)]) -> PackageSet {
    entries
        .iter()
        .map(|(name, version)| (name.to_string(), version.map(str::to_string)))
        .collect()
}

/// Remote validator double. Records every call so tests can assert that the
/// network step did or did not happen.
pub(crate) struct StubRemote {
    problems: Vec<String>,
    error: Option<String>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl StubRemote {
    pub fn accepting() -> Self {
        Self {
            problems: Vec::new(),
            error: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting(problems: &[&str]) -> Self {
        Self {
            problems: problems.iter().map(|p| p.to_string()).collect(),
            ..Self::accepting()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::accepting()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl RemoteValidator for StubRemote {
    fn validate(&self, api_key: &str, log_id: &str) -> Result<Vec<String>> {
        self.calls
            .borrow_mut()
            .push((api_key.to_string(), log_id.to_string()));
        match &self.error {
            Some(message) => bail!("{message}"),
            None => Ok(self.problems.clone()),
        }
    }
}

/// Schema fetcher double serving canned documents by URL.
pub(crate) struct StubSchemas {
    documents: BTreeMap<String, String>,
}

impl StubSchemas {
    /// Every fetch fails, like a machine without network access.
    pub fn offline() -> Self {
        Self {
            documents: BTreeMap::new(),
        }
    }

    pub fn with(mut self, url: &str, document: &str) -> Self {
        self.documents.insert(url.to_string(), document.to_string());
        self
    }
}

impl SchemaFetcher for StubSchemas {
    fn fetch(&self, url: &str) -> Result<String> {
        match self.documents.get(url) {
            Some(document) => Ok(document.clone()),
            None => bail!("no route to {url}"),
        }
    }
}

/// Runs one detector against a manifest and returns the report it built.
pub(crate) fn run_detector(
    family: FamilyId,
    run: fn(&mut DetectorRun<'_>) -> Result<()>,
    manifest: &Manifest,
    packages: &PackageSet,
    remote: &dyn RemoteValidator,
    schemas: &dyn SchemaFetcher,
    verbose: bool,
) -> DiagnosisReport {
    let root = manifest.dir().to_owned();
    let mut report = DiagnosisReport::new(ProjectPath::from(root.as_path()));
    let mut cx = DetectorRun {
        manifest,
        packages,
        report: &mut report,
        remote,
        schemas,
        family,
        verbose,
    };
    run(&mut cx).unwrap();
    report
}

/// Messages of all findings, in order.
pub(crate) fn finding_messages(report: &DiagnosisReport) -> Vec<&str> {
    report.findings.iter().map(|f| f.message.as_str()).collect()
}

pub(crate) const API_KEY: &str = "0123456789abcdef0123456789abcdef";
pub(crate) const LOG_ID: &str = "d1b44e1f-eae5-4b23-b31f-327ada6978da";
