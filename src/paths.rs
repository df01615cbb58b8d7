//! Source-to-target path remapping for batch uploads.

use std::path::{Component, Path, PathBuf};

/// Maps every source path to `target_root` joined with its path relative
/// to `source_root`. Relative roots and sources are taken against `cwd`, so
/// absolute glob results and project-relative ones remap the same way.
/// Output is index-aligned with `sources`; nothing is sorted or
/// deduplicated. Targets are remote resource paths and always use `/` as
/// separator.
pub fn remap<P: AsRef<Path>>(
    cwd: &Path,
    source_root: &str,
    target_root: &str,
    sources: &[P],
) -> Vec<String> {
    let base = normalize(&cwd.join(source_root));
    sources
        .iter()
        .map(|source| {
            let source = normalize(&cwd.join(source.as_ref()));
            let relative = pathdiff::diff_paths(&source, &base).unwrap_or(source);
            join(target_root, &relative)
        })
        .collect()
}

/// Lexically folds `.` and `..` so `diff_paths` only sees plain components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Joins onto the target root; a relative path climbing out of the source
/// root also climbs out of the target root.
fn join(root: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = root
        .split('/')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if matches!(parts.last(), Some(last) if last != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            _ => {}
        }
    }
    parts.join("/")
}
