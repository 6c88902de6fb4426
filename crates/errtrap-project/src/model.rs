use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;

/// Directory names skipped at any depth while walking a project tree.
/// Version control, IDE state, build output, and dependency caches.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".github",
    ".vs",
    ".vscode",
    "bin",
    "obj",
    "packages",
    "node_modules",
];

/// The two manifest shapes the locator recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManifestKind {
    /// SDK/MSBuild project file (`*.csproj`) with `PackageReference` items.
    Project,
    /// Legacy NuGet lock file (`packages.config`) with `package` elements.
    PackagesConfig,
}

/// One discovered build manifest. Immutable for the rest of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub path: Utf8PathBuf,
    pub kind: ManifestKind,
}

impl Manifest {
    /// Directory containing the manifest; sibling configs are resolved from here.
    pub fn dir(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(Utf8Path::new("."))
    }

    /// Conventional sibling file path (`web.config`, `Program.cs`, ...).
    pub fn sibling(&self, name: &str) -> Utf8PathBuf {
        self.dir().join(name)
    }
}

/// Recognized packages declared by one manifest: lowercased name to optional
/// version string. Duplicate declarations keep the last occurrence.
pub type PackageSet = BTreeMap<String, Option<String>>;
