//! Project adapters: walk a source tree for build manifests and index the
//! error-logging packages each manifest declares.
//!
//! This crate is allowed to do filesystem IO. Parsing is heuristic:
//! manifests are streamed with quick-xml, and a malformed manifest is an
//! error local to that file, never to the whole scan.

#![forbid(unsafe_code)]

mod index;
mod locate;
mod model;

pub use index::{index_packages, SERILOG_SINK_PACKAGE, TOOL_PACKAGE_PREFIX};
pub use locate::{locate_manifests, locate_source_files};
pub use model::{Manifest, ManifestKind, PackageSet, EXCLUDED_DIRS};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use crate::model::PackageSet;

    /// Parse arbitrary text as a csproj manifest. **Never panics**.
    pub fn index_project_manifest(text: &str) -> anyhow::Result<PackageSet> {
        crate::index::index_project(text)
    }

    /// Parse arbitrary text as a packages.config manifest. **Never panics**.
    pub fn index_packages_config(text: &str) -> anyhow::Result<PackageSet> {
        crate::index::index_packages_config(text)
    }
}
