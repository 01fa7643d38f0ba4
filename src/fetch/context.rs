//! The fetched source tree handed to the build stage.

use std::path::{Path, PathBuf};

/// Where the application source lives after a successful fetch.
///
/// Resource paths for the build resolve against `source_root` instead of the
/// process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    source_root: PathBuf,
}

impl BuildContext {
    /// Create a context rooted at `source_root`, made absolute.
    pub fn new(source_root: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            source_root: std::path::absolute(source_root)?,
        })
    }

    /// Absolute root of the fetched tree.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Resolve a path relative to the source root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.source_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn source_root_is_absolute() {
        let ctx = BuildContext::new("source").unwrap();
        assert!(ctx.source_root().is_absolute());
        assert!(ctx.source_root().ends_with("source"));
    }

    #[test]
    fn resolves_resources_under_root() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::new(temp.path()).unwrap();
        assert_eq!(ctx.resolve("templates"), temp.path().join("templates"));
    }

    #[test]
    fn absolute_paths_pass_through() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::new(temp.path().join("source")).unwrap();
        let elsewhere = temp.path().join("assets");
        assert_eq!(ctx.resolve(&elsewhere), elsewhere);
    }
}
