//! SelfTrack installer - bootstrap a Python application from source.
//!
//! The installer resolves the application's runtime dependencies into an
//! external Python interpreter, clones the application source, packages it
//! into a single executable and installs that executable under the user's
//! home directory.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types, result alias and exit codes
//! - [`requirements`] - Dependency probing, resolution and module loading
//! - [`fetch`] - Source cloning into a build context
//! - [`build`] - Packaging tool invocation
//! - [`install`] - Artifact placement
//! - [`runner`] - The ordered bootstrap pipeline
//! - [`shell`] - External command execution and host detection
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use selftrack_installer::requirements::{classify_install_failure, FailureKind};
//!
//! let stderr = "ERROR: No matching distribution found for flaskk";
//! assert_eq!(classify_install_failure(stderr), FailureKind::InvalidPackage);
//! ```
//!
//! For full pipeline runs against a scripted runtime, see the integration
//! tests.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod install;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod ui;

pub use error::{InstallerError, Result};
