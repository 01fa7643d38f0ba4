//! Installing the artifact into a per-user location.

pub mod installer;
pub mod target;

pub use installer::install;
pub use target::{InstallTarget, DEFAULT_INSTALL_DIR};
