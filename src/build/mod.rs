//! Packaging the fetched source into a single-file executable.

pub mod descriptor;
pub mod orchestrator;

pub use descriptor::{BuildDescriptor, ResourceBundle};
pub use orchestrator::{format_elapsed, BuildOrchestrator, BuildResult, PACKAGER_MODULE};
