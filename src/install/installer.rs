//! Copies the built artifact into place.

use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};

use super::target::InstallTarget;

/// Copy `artifact` into `target` and return the installed path.
///
/// The target directory is created if needed; an existing directory or a
/// previous install is not an error.
///
/// # Errors
///
/// Returns `InstallerError::Install` naming the path that failed.
pub fn install(artifact: &Path, target: &InstallTarget) -> Result<PathBuf> {
    if !artifact.is_file() {
        return Err(install_error(artifact, "built artifact not found"));
    }

    std::fs::create_dir_all(&target.directory)
        .map_err(|e| install_error(&target.directory, &e.to_string()))?;

    let dest = target.executable_path();
    std::fs::copy(artifact, &dest).map_err(|e| install_error(&dest, &e.to_string()))?;

    let dest = std::path::absolute(&dest).map_err(|e| install_error(&dest, &e.to_string()))?;
    tracing::info!("Installed {} to {}", artifact.display(), dest.display());
    Ok(dest)
}

fn install_error(path: &Path, message: &str) -> InstallerError {
    InstallerError::Install {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifact(temp: &TempDir) -> PathBuf {
        let dist = temp.path().join("source").join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        let path = dist.join("SelfTrack");
        std::fs::write(&path, b"binary").unwrap();
        path
    }

    fn target(temp: &TempDir) -> InstallTarget {
        InstallTarget {
            directory: temp.path().join("home").join(".selftrack"),
            executable_name: "SelfTrack".to_string(),
        }
    }

    #[test]
    fn copies_artifact_into_new_directory() {
        let temp = TempDir::new().unwrap();
        let src = artifact(&temp);
        let target = target(&temp);

        let installed = install(&src, &target).unwrap();

        assert!(installed.is_absolute());
        assert_eq!(installed, target.directory.join("SelfTrack"));
        assert_eq!(std::fs::read(&installed).unwrap(), b"binary");
    }

    #[test]
    fn reinstall_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = artifact(&temp);
        let target = target(&temp);

        install(&src, &target).unwrap();
        std::fs::write(&src, b"binary v2").unwrap();
        let installed = install(&src, &target).unwrap();

        assert_eq!(std::fs::read(installed).unwrap(), b"binary v2");
    }

    #[test]
    fn missing_artifact_names_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("dist").join("SelfTrack");

        let err = install(&missing, &target(&temp)).unwrap_err();

        match &err {
            InstallerError::Install { path, .. } => assert_eq!(path, &missing),
            other => panic!("Expected Install error, got {:?}", other),
        }
        assert!(!target(&temp).directory.exists());
    }

    #[test]
    fn unwritable_directory_names_path() {
        let temp = TempDir::new().unwrap();
        let src = artifact(&temp);
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let target = InstallTarget {
            directory: blocker.join("inner"),
            executable_name: "SelfTrack".to_string(),
        };

        let err = install(&src, &target).unwrap_err();
        match err {
            InstallerError::Install { path, .. } => assert_eq!(path, blocker.join("inner")),
            other => panic!("Expected Install error, got {:?}", other),
        }
    }
}
