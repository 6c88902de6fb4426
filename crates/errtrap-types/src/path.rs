use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path as it appears in detections, findings, and the JSON report.
///
/// Stored as the path was discovered (absolute or relative to the scanned
/// root), with separators normalized to forward slashes so report output is
/// identical across platforms.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Utf8Path {
        Utf8Path::new(&self.0)
    }

    pub fn join(&self, segment: &str) -> ProjectPath {
        ProjectPath::new(self.as_path().join(segment).as_str())
    }

    /// Final path component, used when a message names just the file.
    pub fn file_name(&self) -> &str {
        self.as_path().file_name().unwrap_or(self.as_str())
    }
}

impl Default for ProjectPath {
    fn default() -> Self {
        ProjectPath::new(".")
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for ProjectPath {
    fn from(value: &Utf8Path) -> Self {
        ProjectPath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for ProjectPath {
    fn from(value: Utf8PathBuf) -> Self {
        ProjectPath::new(value.as_str())
    }
}
