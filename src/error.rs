//! Error types for installer operations.
//!
//! This module defines [`InstallerError`], the primary error type used
//! throughout the installer, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every pipeline stage reports fatal conditions as an `InstallerError`
//! - Each variant maps to a process exit code via [`InstallerError::exit_code`]
//! - Use `anyhow::Error` (via `InstallerError::Other`) for unexpected errors
//! - Expected negative results (package absent, stale clone) are values, not errors

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes, one per class of fatal failure.
pub mod exit_codes {
    /// Full pipeline success.
    pub const SUCCESS: i32 = 0;
    /// Usage, configuration and unclassified errors.
    pub const GENERAL: i32 = 1;
    /// A dependency could not be resolved.
    pub const DEPENDENCY: i32 = 2;
    /// A resolved dependency still cannot be loaded by the runtime.
    pub const ENVIRONMENT: i32 = 3;
    /// The application source could not be fetched.
    pub const FETCH: i32 = 4;
    /// The packaging tool failed.
    pub const BUILD: i32 = 5;
    /// The artifact could not be installed.
    pub const INSTALL: i32 = 6;
}

/// Core error type for installer operations.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// An external program could not be launched at all.
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The runtime could not answer a package probe.
    #[error("Probe for '{package}' failed: {message}")]
    Probe { package: String, message: String },

    /// A dependency resolved to a terminal outcome.
    #[error("Dependency '{package}' could not be resolved: {message}")]
    DependencyUnresolved { package: String, message: String },

    /// A dependency is installed but the runtime cannot load it.
    #[error("Module '{module}' cannot be loaded: {message}")]
    EnvironmentBroken { module: String, message: String },

    /// A stage needed a capability whose providing module is not loaded.
    #[error("No loaded module provides {capability}")]
    CapabilityUnavailable { capability: String },

    /// Cloning the application source failed.
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The packaging tool exited unsuccessfully.
    #[error("Build of '{output_name}' failed with exit code {code:?}")]
    Build {
        output_name: String,
        code: Option<i32>,
    },

    /// Copying the artifact into place failed.
    #[error("Install failed at {path}: {message}")]
    Install { path: PathBuf, message: String },

    /// The user's home directory could not be determined.
    #[error("Could not determine the home directory for the install location")]
    HomeDirUnavailable,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallerError {
    /// Exit code the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Probe { .. } | Self::DependencyUnresolved { .. } => exit_codes::DEPENDENCY,
            Self::EnvironmentBroken { .. } | Self::CapabilityUnavailable { .. } => {
                exit_codes::ENVIRONMENT
            }
            Self::Fetch { .. } => exit_codes::FETCH,
            Self::Build { .. } => exit_codes::BUILD,
            Self::Install { .. } | Self::HomeDirUnavailable => exit_codes::INSTALL,
            Self::ConfigNotFound { .. }
            | Self::ConfigParseError { .. }
            | Self::ConfigValidationError { .. }
            | Self::Spawn { .. }
            | Self::Io(_)
            | Self::Other(_) => exit_codes::GENERAL,
        }
    }
}

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = InstallerError::ConfigNotFound {
            path: PathBuf::from("/foo/installer.yml"),
        };
        assert!(err.to_string().contains("/foo/installer.yml"));
    }

    #[test]
    fn spawn_error_names_program() {
        let err = InstallerError::Spawn {
            program: "python3".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("python3"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn dependency_errors_share_exit_code() {
        let unresolved = InstallerError::DependencyUnresolved {
            package: "flaskk".into(),
            message: "invalid package".into(),
        };
        let probe = InstallerError::Probe {
            package: "flask".into(),
            message: "bad output".into(),
        };
        assert_eq!(unresolved.exit_code(), exit_codes::DEPENDENCY);
        assert_eq!(probe.exit_code(), exit_codes::DEPENDENCY);
    }

    #[test]
    fn stage_errors_have_distinct_exit_codes() {
        let codes = [
            InstallerError::EnvironmentBroken {
                module: "dulwich".into(),
                message: "gone".into(),
            }
            .exit_code(),
            InstallerError::Fetch {
                url: "https://example.com/repo".into(),
                message: "network".into(),
            }
            .exit_code(),
            InstallerError::Build {
                output_name: "SelfTrack".into(),
                code: Some(1),
            }
            .exit_code(),
            InstallerError::HomeDirUnavailable.exit_code(),
        ];
        assert_eq!(
            codes,
            [
                exit_codes::ENVIRONMENT,
                exit_codes::FETCH,
                exit_codes::BUILD,
                exit_codes::INSTALL
            ]
        );
        assert!(codes.iter().all(|c| *c != exit_codes::SUCCESS));
    }

    #[test]
    fn config_errors_are_general() {
        let err = InstallerError::ConfigValidationError {
            message: "missing".into(),
        };
        assert_eq!(err.exit_code(), exit_codes::GENERAL);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: InstallerError = io_err.into();
        assert!(matches!(err, InstallerError::Io(_)));
    }

    #[test]
    fn install_error_displays_path() {
        let err = InstallerError::Install {
            path: PathBuf::from("/home/u/.selftrack/SelfTrack"),
            message: "permission denied".into(),
        };
        assert!(err.to_string().contains("/home/u/.selftrack/SelfTrack"));
    }
}
