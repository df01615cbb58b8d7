//! Glob expansion of local files.

use crate::error::{Result, ThemeError};
use std::path::PathBuf;
use tracing::warn;

/// Expands a glob pattern into existing files. Implementations must return
/// a stable order; uploads report results by position in this list.
pub trait GlobResolver {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Resolves patterns against the local filesystem, relative to the working
/// directory unless the pattern is absolute. Directories are skipped and
/// the result is sorted.
#[derive(Clone, Debug, Default)]
pub struct FsGlobResolver;

impl GlobResolver for FsGlobResolver {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern)
            .map_err(|e| ThemeError::InvalidArguments(format!("invalid glob pattern: {pattern} ({e})")))?;

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %e.path().display(), "skipping unreadable glob entry: {}", e.error()),
            }
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_files_in_stable_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/sub")).unwrap();
        std::fs::write(root.join("src/b.css"), "b").unwrap();
        std::fs::write(root.join("src/a.css"), "a").unwrap();
        std::fs::write(root.join("src/sub/c.css"), "c").unwrap();
        std::fs::write(root.join("src/ignored.js"), "js").unwrap();

        let pattern = format!("{}/src/**/*.css", root.display());
        let found = FsGlobResolver.resolve(&pattern).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("src/a.css"),
                root.join("src/b.css"),
                root.join("src/sub/c.css"),
            ]
        );
    }

    #[test]
    fn directories_are_not_returned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("theme/css")).unwrap();

        let pattern = format!("{}/theme/*", dir.path().display());
        assert!(FsGlobResolver.resolve(&pattern).unwrap().is_empty());
    }

    #[test]
    fn invalid_pattern_is_invalid_arguments() {
        let err = FsGlobResolver.resolve("src/[").unwrap_err();
        assert!(matches!(err, ThemeError::InvalidArguments(_)));
    }
}
