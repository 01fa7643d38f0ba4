//! Clone backends.
//!
//! A [`Cloner`] performs one full clone and reports a pre-existing
//! destination as a distinguishable condition. Deciding what to do about it
//! is the fetcher's job.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::InstallerError;
use crate::requirements::PythonRuntime;
use crate::shell::{CommandRunner, CommandSpec};

/// Why a clone did not happen.
#[derive(Debug, Error)]
pub enum CloneError {
    /// The destination directory is already there.
    #[error("destination {} already exists", .0.display())]
    DestinationExists(PathBuf),

    /// The clone tool ran and failed.
    #[error("{0}")]
    Failed(String),

    /// The clone tool could not be launched.
    #[error(transparent)]
    Launch(#[from] InstallerError),
}

/// Performs a full clone of a remote repository.
pub trait Cloner {
    /// Clone `url` into `dest`, which must not exist yet.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneError>;

    /// Command that [`clone_repo`](Cloner::clone_repo) would run.
    fn command(&self, url: &str, dest: &Path) -> CommandSpec;
}

fn run_clone(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    dest: &Path,
) -> Result<(), CloneError> {
    if dest.exists() {
        return Err(CloneError::DestinationExists(dest.to_path_buf()));
    }

    tracing::debug!("Cloning with: {}", spec.display());
    let result = runner.run(spec)?;
    if result.success {
        return Ok(());
    }

    let detail = match result.stderr.trim() {
        "" => result.stdout.trim(),
        stderr => stderr,
    };
    Err(CloneError::Failed(format!(
        "clone exited with {:?}: {}",
        result.exit_code, detail
    )))
}

/// Clones with the runtime's `dulwich` module.
pub struct DulwichCloner<'a> {
    runner: &'a dyn CommandRunner,
    runtime: &'a PythonRuntime,
}

impl<'a> DulwichCloner<'a> {
    /// Create a cloner backed by a runtime that has `dulwich` loaded.
    pub fn new(runner: &'a dyn CommandRunner, runtime: &'a PythonRuntime) -> Self {
        Self { runner, runtime }
    }
}

impl Cloner for DulwichCloner<'_> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneError> {
        run_clone(self.runner, &self.command(url, dest), dest)
    }

    fn command(&self, url: &str, dest: &Path) -> CommandSpec {
        self.runtime.module_command(
            "dulwich",
            [
                "clone".to_string(),
                url.to_string(),
                dest.to_string_lossy().into_owned(),
            ],
        )
    }
}

/// Clones with the `git` command line tool.
pub struct GitCloner<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitCloner<'a> {
    /// Create a cloner that runs `git` from PATH.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl Cloner for GitCloner<'_> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneError> {
        run_clone(self.runner, &self.command(url, dest), dest)
    }

    fn command(&self, url: &str, dest: &Path) -> CommandSpec {
        CommandSpec::new("git").args([
            "clone".to_string(),
            url.to_string(),
            dest.to_string_lossy().into_owned(),
        ])
    }
}
