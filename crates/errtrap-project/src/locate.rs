use crate::model::{Manifest, ManifestKind, EXCLUDED_DIRS};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Discover build manifests under `root`.
///
/// Walks recursively, skipping [`EXCLUDED_DIRS`] at any depth, and matches
/// `*.csproj` and `packages.config` by file name (case-insensitive, as the
/// diagnosed ecosystem's filesystems usually are). Output is sorted by path
/// so the rest of the run is deterministic.
pub fn locate_manifests(root: &Utf8Path) -> anyhow::Result<Vec<Manifest>> {
    // Index 0 is the project glob, index 1 the legacy lock file.
    let matcher =
        name_matcher(&["*.csproj", "packages.config"]).context("compile manifest globset")?;

    let mut out: Vec<Manifest> = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(keep_entry)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        let Some(name) = path.file_name() else {
            continue;
        };
        let matches = matcher.matches(name);
        if matches.is_empty() {
            continue;
        }
        let kind = if matches.contains(&1) {
            ManifestKind::PackagesConfig
        } else {
            ManifestKind::Project
        };
        out.push(Manifest { path, kind });
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    out.dedup();
    Ok(out)
}

/// Discover `*.cs` files under `root`, sorted, with the standard exclusions.
/// Used by detectors that scan source trees for an activation marker.
pub fn locate_source_files(root: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let matcher = name_matcher(&["*.cs"]).context("compile source globset")?;

    let mut out: Vec<Utf8PathBuf> = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(keep_entry)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        let Some(name) = path.file_name() else {
            continue;
        };
        if matcher.is_match(name) {
            out.push(path);
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

/// Keep everything except excluded directories; the walk root itself is
/// always kept, whatever it is named.
fn keep_entry(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !EXCLUDED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d))
}

fn name_matcher(patterns: &[&str]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(GlobBuilder::new(p).case_insensitive(true).build()?);
    }
    Ok(b.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    fn write_file(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    #[test]
    fn locate_finds_both_manifest_kinds_sorted() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);

        write_file(&root.join("z/App.csproj"), "<Project/>");
        write_file(&root.join("a/packages.config"), "<packages/>");

        let manifests = locate_manifests(&root).expect("locate");
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[0].kind, ManifestKind::PackagesConfig);
        assert!(manifests[0].path.as_str().ends_with("a/packages.config"));
        assert_eq!(manifests[1].kind, ManifestKind::Project);
        assert!(manifests[1].path.as_str().ends_with("z/App.csproj"));
    }

    #[test]
    fn locate_skips_excluded_dirs_at_any_depth() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);

        write_file(&root.join("src/App.csproj"), "<Project/>");
        write_file(&root.join("src/obj/Generated.csproj"), "<Project/>");
        write_file(&root.join("bin/Debug/Other.csproj"), "<Project/>");
        write_file(&root.join("deep/node_modules/pkg/x.csproj"), "<Project/>");

        let manifests = locate_manifests(&root).expect("locate");
        let paths: Vec<&str> = manifests.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("src/App.csproj"));
    }

    #[test]
    fn locate_matches_names_case_insensitively() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);

        write_file(&root.join("App.CSPROJ"), "<Project/>");
        write_file(&root.join("Packages.Config"), "<packages/>");

        let manifests = locate_manifests(&root).expect("locate");
        assert_eq!(manifests.len(), 2);
    }

    #[test]
    fn walk_root_named_like_excluded_dir_is_still_scanned() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp).join("bin");

        write_file(&root.join("App.csproj"), "<Project/>");

        let manifests = locate_manifests(&root).expect("locate");
        assert_eq!(manifests.len(), 1);
    }

    #[test]
    fn locate_source_files_sorted_with_exclusions() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);

        write_file(&root.join("b/Program.cs"), "");
        write_file(&root.join("a/Startup.cs"), "");
        write_file(&root.join("obj/Gen.cs"), "");

        let files = locate_source_files(&root).expect("locate");
        let names: Vec<&str> = files.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["Startup.cs", "Program.cs"]);
    }

    #[test]
    fn missing_root_yields_no_manifests() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp).join("does-not-exist");

        let manifests = locate_manifests(&root).expect("locate");
        assert!(manifests.is_empty());
    }
}
