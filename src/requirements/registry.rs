//! Capability registry.
//!
//! Runtime modules are declared up front together with the capabilities
//! they provide. Later pipeline stages never assume a module is usable;
//! they look up a [`Capability`] and get the providing module only once the
//! loader has verified it.

use std::fmt;

use crate::error::{InstallerError, Result};

use super::loader::LoadReport;

/// Something a runtime module lets the pipeline do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Clone remote git repositories.
    SourceClone,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::SourceClone => write!(f, "source cloning"),
        }
    }
}

/// A module known to the registry.
#[derive(Debug, Clone)]
pub struct RegisteredModule {
    /// Import name of the module.
    pub module: String,
    /// Capabilities this module provides.
    pub provides: Vec<Capability>,
    /// Load report, once the loader verified the module.
    pub loaded: Option<LoadReport>,
}

impl RegisteredModule {
    /// Whether the loader has verified this module.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }
}

/// Registry of runtime modules keyed by import name.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    modules: Vec<RegisteredModule>,
}

impl CapabilityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The modules the installer knows how to use.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.declare("dulwich", &[Capability::SourceClone]);
        registry
    }

    /// Declare a module and its capabilities, replacing any prior declaration.
    pub fn declare(&mut self, module: &str, provides: &[Capability]) {
        self.modules.retain(|m| m.module != module);
        self.modules.push(RegisteredModule {
            module: module.to_string(),
            provides: provides.to_vec(),
            loaded: None,
        });
    }

    /// Look up a module by import name.
    pub fn get(&self, module: &str) -> Option<&RegisteredModule> {
        self.modules.iter().find(|m| m.module == module)
    }

    /// Whether the named module has been loaded.
    pub fn is_loaded(&self, module: &str) -> bool {
        self.get(module).is_some_and(RegisteredModule::is_loaded)
    }

    /// Record a successful load.
    ///
    /// Modules that were never declared are registered without capabilities.
    pub fn mark_loaded(&mut self, report: LoadReport) {
        match self.modules.iter_mut().find(|m| m.module == report.module) {
            Some(entry) => entry.loaded = Some(report),
            None => {
                tracing::debug!("Registering undeclared module '{}'", report.module);
                self.modules.push(RegisteredModule {
                    module: report.module.clone(),
                    provides: Vec::new(),
                    loaded: Some(report),
                });
            }
        }
    }

    /// The loaded module providing `capability`.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::CapabilityUnavailable` if no loaded module
    /// provides it.
    pub fn require(&self, capability: Capability) -> Result<&RegisteredModule> {
        self.modules
            .iter()
            .find(|m| m.is_loaded() && m.provides.contains(&capability))
            .ok_or_else(|| InstallerError::CapabilityUnavailable {
                capability: capability.to_string(),
            })
    }

    /// All registered modules, in declaration order.
    pub fn modules(&self) -> &[RegisteredModule] {
        &self.modules
    }
}
