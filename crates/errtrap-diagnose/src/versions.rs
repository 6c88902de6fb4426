//! Package version policy.

use crate::detect::DetectorRun;

/// Major release lines that predate the current API surface.
const DEPRECATED_PREFIXES: &[&str] = &["1.", "2."];

/// Returns the deprecated major prefix a version string falls under, if any.
/// Blank versions are nobody's problem here; floating ranges and wildcards
/// only match when they literally start with a deprecated prefix.
pub fn deprecated_major(version: &str) -> Option<&'static str> {
    if version.trim().is_empty() {
        return None;
    }
    DEPRECATED_PREFIXES
        .iter()
        .copied()
        .find(|prefix| version.starts_with(prefix))
}

/// Flags deprecated versions of the family's packages. Packages without a
/// version survive silently; when none of `names` is referenced at all the
/// detector only leaves a verbose note.
pub(crate) fn diagnose_versions(cx: &mut DetectorRun<'_>, names: &[&str]) {
    let mut found = false;
    for name in names {
        let Some(version) = cx.packages.get(*name) else {
            continue;
        };
        found = true;
        let Some(version) = version.as_deref() else {
            continue;
        };
        if let Some(prefix) = deprecated_major(version) {
            cx.error(format!(
                "An old {prefix}x package is referenced. Install the newest version from NuGet."
            ));
        }
    }
    if !found {
        cx.note(format!("None of the packages {} were found", names.join(", ")));
    }
}
