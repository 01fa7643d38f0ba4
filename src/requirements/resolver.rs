//! Dependency resolver.
//!
//! Probes for a package, installs it through the package manager when it
//! is absent, re-probes, and classifies the result as an
//! [`InstallOutcome`].

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::CommandRunner;

use super::probe::PackageProber;
use super::runtime::PythonRuntime;
use super::signatures::{classify_install_failure, FailureKind, SIGNATURE_SET_VERSION};
use super::status::InstallOutcome;

/// Resolves dependencies into a [`PythonRuntime`].
pub struct DependencyResolver<'a> {
    runner: &'a dyn CommandRunner,
    runtime: &'a PythonRuntime,
    diagnostic_file: PathBuf,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver that writes install diagnostics to `diagnostic_file`.
    pub fn new(
        runner: &'a dyn CommandRunner,
        runtime: &'a PythonRuntime,
        diagnostic_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            runtime,
            diagnostic_file: diagnostic_file.into(),
        }
    }

    /// Path of the diagnostic file written on unrecognised failures.
    pub fn diagnostic_file(&self) -> &Path {
        &self.diagnostic_file
    }

    /// Make sure `name` is installed.
    ///
    /// Expected outcomes (present, installed, failed installs) are returned
    /// as values. `Err` is reserved for the runtime itself misbehaving:
    /// the interpreter cannot be launched or a probe fails. A diagnostic
    /// file that cannot be written is logged and leaves the outcome
    /// without a file.
    pub fn resolve(&self, name: &str) -> Result<InstallOutcome> {
        let prober = PackageProber::new(self.runner, self.runtime);

        let probe = prober.probe(name)?;
        if probe.installed {
            return Ok(InstallOutcome::AlreadyPresent {
                version: probe.version_or_unknown(),
            });
        }

        tracing::info!("{} not installed, installing", name);
        let spec = self.runtime.module_command("pip", ["install", name]);
        let install = self.runner.run(&spec)?;

        if install.success {
            let recheck = prober.probe(name)?;
            return Ok(if recheck.installed {
                InstallOutcome::Installed {
                    version: recheck.version_or_unknown(),
                }
            } else {
                tracing::warn!("{} installed but not detected by the runtime", name);
                InstallOutcome::InstalledButUndetected
            });
        }

        let kind = classify_install_failure(&install.stderr);
        tracing::debug!(
            "Install of {} failed, classified as {:?} (signature set v{})",
            name,
            kind,
            SIGNATURE_SET_VERSION
        );

        match kind {
            FailureKind::InvalidPackage => Ok(InstallOutcome::InvalidPackage {
                error_text: install.stderr,
            }),
            kind => {
                let diagnostic_file = match std::fs::write(&self.diagnostic_file, &install.stderr) {
                    Ok(()) => {
                        tracing::debug!("stderr saved to {}", self.diagnostic_file.display());
                        Some(self.diagnostic_file.clone())
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Could not write {}: {}",
                            self.diagnostic_file.display(),
                            e
                        );
                        None
                    }
                };
                Ok(InstallOutcome::InstallFailed {
                    error_text: install.stderr,
                    kind,
                    diagnostic_file,
                })
            }
        }
    }
}
