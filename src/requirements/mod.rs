//! Dependency probing, resolution and loading.
//!
//! Every dependency the installer needs lives in an external Python
//! runtime. This module checks whether each one is present, installs the
//! missing ones, and verifies that modules can actually be imported before
//! later stages rely on them.
//!
//! # Modules
//!
//! - [`runtime`] - Handle on the external interpreter
//! - [`probe`] - Read-only presence and version checks
//! - [`resolver`] - Probe, install, re-probe and classify
//! - [`signatures`] - Versioned table of recognised install failures
//! - [`status`] - Probe and resolution result types
//! - [`loader`] - Import verification with a single resolve-then-load retry
//! - [`registry`] - Capabilities provided by loaded modules

pub mod loader;
pub mod probe;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod signatures;
pub mod status;

pub use loader::{LoadReport, ModuleLoader, SubpackageFailure};
pub use probe::PackageProber;
pub use registry::{Capability, CapabilityRegistry, RegisteredModule};
pub use resolver::DependencyResolver;
pub use runtime::PythonRuntime;
pub use signatures::{
    built_in_signatures, classify_install_failure, FailureKind, FailureSignature,
    SIGNATURE_SET_VERSION,
};
pub use status::{InstallOutcome, ProbeResult};
