//! Dependency probe and resolution result types.

use serde::Deserialize;
use std::path::PathBuf;

use super::signatures::FailureKind;

/// Result of probing the runtime for a package.
///
/// Produced fresh by every probe; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeResult {
    /// Whether an installed distribution was found.
    pub installed: bool,
    /// Installed version, when found.
    pub version: Option<String>,
}

impl ProbeResult {
    /// A negative probe.
    pub fn absent() -> Self {
        Self {
            installed: false,
            version: None,
        }
    }

    /// A positive probe with a version.
    pub fn present(version: impl Into<String>) -> Self {
        Self {
            installed: true,
            version: Some(version.into()),
        }
    }

    /// The version, or a placeholder when the runtime reported none.
    pub fn version_or_unknown(&self) -> String {
        self.version.clone().unwrap_or_else(|| "unknown".to_string())
    }
}

/// Outcome of resolving one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Already installed; no install command was run.
    AlreadyPresent { version: String },

    /// Installed by the package manager and visible to a fresh probe.
    Installed { version: String },

    /// The package manager reported success but the runtime cannot see it.
    InstalledButUndetected,

    /// The package index does not know this name.
    InvalidPackage { error_text: String },

    /// The install failed for another reason.
    InstallFailed {
        /// Raw error stream of the install command.
        error_text: String,
        /// Best-effort classification of the failure.
        kind: FailureKind,
        /// Diagnostic file the error text was written to, if writing it
        /// succeeded.
        diagnostic_file: Option<PathBuf>,
    },
}

impl InstallOutcome {
    /// Whether the pipeline may continue past this dependency.
    pub fn can_continue(&self) -> bool {
        matches!(
            self,
            InstallOutcome::AlreadyPresent { .. } | InstallOutcome::Installed { .. }
        )
    }

    /// Whether this outcome halts the pipeline.
    pub fn is_terminal(&self) -> bool {
        !self.can_continue()
    }

    /// Installed version, for continuable outcomes.
    pub fn version(&self) -> Option<&str> {
        match self {
            InstallOutcome::AlreadyPresent { version } | InstallOutcome::Installed { version } => {
                Some(version)
            }
            _ => None,
        }
    }

    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            InstallOutcome::AlreadyPresent { .. } => "already present",
            InstallOutcome::Installed { .. } => "installed",
            InstallOutcome::InstalledButUndetected => "installed but undetected",
            InstallOutcome::InvalidPackage { .. } => "invalid package",
            InstallOutcome::InstallFailed { .. } => "install failed",
        }
    }
}
