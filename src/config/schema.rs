//! Configuration schema types.
//!
//! Every section defaults to the values of the stock SelfTrack install, so
//! an empty (or absent) config file reproduces the standard pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default upstream repository of the application.
pub const DEFAULT_REPOSITORY: &str = "https://github.com/sirsevrusio/selftrack";

/// Name of the diagnostic file written on unrecognised install failures.
pub const DEFAULT_ERROR_FILE: &str = "error.txt";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Python interpreter used to probe, install and load dependencies.
    pub python: Option<String>,

    /// Dependencies, resolved in declared order.
    pub dependencies: Vec<DependencySpec>,

    /// Where the application source comes from.
    pub source: SourceConfig,

    /// Packaging tool settings.
    pub build: BuildConfig,

    /// Install location settings.
    pub install: InstallConfig,

    /// Diagnostics settings.
    pub diagnostics: DiagnosticsConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            python: None,
            dependencies: default_dependencies(),
            source: SourceConfig::default(),
            build: BuildConfig::default(),
            install: InstallConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

fn default_dependencies() -> Vec<DependencySpec> {
    vec![
        DependencySpec::new("flask"),
        DependencySpec::new("requests"),
        DependencySpec::new("pyinstaller"),
        DependencySpec::with_import("dulwich", "dulwich"),
    ]
}

/// A required runtime package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Package name known to the package index.
    pub name: String,

    /// Module to load after resolution; None means probe/install only.
    #[serde(default, rename = "import", skip_serializing_if = "Option::is_none")]
    pub import_alias: Option<String>,
}

impl DependencySpec {
    /// A dependency that is only probed and installed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import_alias: None,
        }
    }

    /// A dependency that is also loaded under `alias`.
    pub fn with_import(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import_alias: Some(alias.into()),
        }
    }
}

/// Backend used to clone the application source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Clone through the runtime's `dulwich` module.
    #[default]
    Dulwich,
    /// Clone with the `git` command-line client.
    Git,
}

/// Source acquisition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Remote repository URL.
    pub repository: String,

    /// Clone directory, relative to the working directory.
    pub directory: PathBuf,

    /// Clone backend.
    pub backend: FetchBackend,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            directory: PathBuf::from("source"),
            backend: FetchBackend::default(),
        }
    }
}

/// A directory embedded into the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Path relative to the source root.
    pub source: PathBuf,

    /// Destination label inside the artifact.
    pub label: String,
}

/// Packaging tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Entry point relative to the source root.
    pub entry_point: PathBuf,

    /// Name of the produced executable (without platform suffix).
    pub output_name: String,

    /// Whether the built executable opens a console window.
    pub console: bool,

    /// Resource directories, in argument order.
    pub resources: Vec<ResourceConfig>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry_point: PathBuf::from("app.py"),
            output_name: "SelfTrack".to_string(),
            console: false,
            resources: vec![
                ResourceConfig {
                    source: PathBuf::from("templates"),
                    label: "templates".to_string(),
                },
                ResourceConfig {
                    source: PathBuf::from("static"),
                    label: "static".to_string(),
                },
            ],
        }
    }
}

/// Install location settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    /// Install directory; `~` expands to the home directory.
    /// Defaults to `~/.selftrack`.
    pub directory: Option<String>,
}

/// Diagnostics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// File receiving the raw error output of a failed install.
    pub error_file: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            error_file: DEFAULT_ERROR_FILE.to_string(),
        }
    }
}
