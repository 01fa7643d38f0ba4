//! Configuration loading, parsing, and validation.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions and built-in defaults in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use selftrack_installer::config::{parse_config, validate};
//! use std::path::Path;
//!
//! let config = parse_config("build:\n  output_name: Tracker\n", Path::new("inline.yml")).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.build.output_name, "Tracker");
//! assert_eq!(config.dependencies.len(), 4);
//! ```
//!
//! # Configuration File Locations
//!
//! 1. `--config <path>` (must exist)
//! 2. `selftrack-installer.yml` in the working directory
//! 3. Built-in defaults

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    discover, load_config, load_config_file, parse_config, ConfigSource, CONFIG_FILE_NAME,
};
pub use schema::{
    BuildConfig, DependencySpec, DiagnosticsConfig, FetchBackend, InstallConfig,
    InstallerConfig, ResourceConfig, SourceConfig, DEFAULT_ERROR_FILE, DEFAULT_REPOSITORY,
};
pub use validator::{validate, validate_config, ValidationError};
