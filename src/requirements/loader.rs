//! Module loader.
//!
//! Verifies that a resolved dependency can be imported by the runtime,
//! together with every direct and transitive subpackage, and records it in
//! the [`CapabilityRegistry`]. If the runtime cannot find a module that was
//! just resolved, the full resolve-then-load sequence is retried once;
//! after that the environment is considered broken.

use serde::Deserialize;

use crate::error::{InstallerError, Result};
use crate::shell::CommandRunner;

use super::registry::CapabilityRegistry;
use super::resolver::DependencyResolver;
use super::runtime::{last_line, PythonRuntime};

/// Exit code of [`LOAD_SCRIPT`] when the top-level import fails.
const MODULE_NOT_FOUND_EXIT: i32 = 3;

/// Imports a module and all its subpackages; prints one JSON object.
const LOAD_SCRIPT: &str = r#"
import importlib, json, pkgutil, sys
name = sys.argv[1]
try:
    module = importlib.import_module(name)
except ImportError as exc:
    sys.stderr.write("%s: %s\n" % (type(exc).__name__, exc))
    sys.exit(3)
loaded, failed = [name], {}
def onerror(pkg):
    kind, value = sys.exc_info()[:2]
    failed.setdefault(pkg, "%s: %s" % (getattr(kind, "__name__", kind), value))
for info in pkgutil.walk_packages(getattr(module, "__path__", []), name + ".", onerror):
    try:
        importlib.import_module(info.name)
        loaded.append(info.name)
    except Exception as exc:
        failed.setdefault(info.name, "%s: %s" % (type(exc).__name__, exc))
print(json.dumps({"module": name, "loaded": loaded, "failed": sorted(failed.items())}))
"#;

/// A subpackage that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpackageFailure {
    /// Dotted subpackage name.
    pub name: String,
    /// Exception raised while importing it.
    pub error: String,
}

/// What a successful load brought in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Top-level module name.
    pub module: String,
    /// Every module imported, top-level first.
    pub loaded: Vec<String>,
    /// Subpackages that failed to import.
    pub failed: Vec<SubpackageFailure>,
    /// Whether the module only loaded after re-resolving its package.
    pub retried: bool,
}

impl LoadReport {
    /// Whether every subpackage imported cleanly.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct LoadOutput {
    module: String,
    loaded: Vec<String>,
    failed: Vec<(String, String)>,
}

impl From<LoadOutput> for LoadReport {
    fn from(out: LoadOutput) -> Self {
        Self {
            module: out.module,
            loaded: out.loaded,
            failed: out
                .failed
                .into_iter()
                .map(|(name, error)| SubpackageFailure { name, error })
                .collect(),
            retried: false,
        }
    }
}

enum Attempt {
    Loaded(LoadReport),
    NotFound(String),
    Failed(String),
}

/// Loads modules from a [`PythonRuntime`].
pub struct ModuleLoader<'a> {
    runner: &'a dyn CommandRunner,
    runtime: &'a PythonRuntime,
}

impl<'a> ModuleLoader<'a> {
    /// Create a loader for a runtime.
    pub fn new(runner: &'a dyn CommandRunner, runtime: &'a PythonRuntime) -> Self {
        Self { runner, runtime }
    }

    /// Load `module`, owned by `package`, and register it.
    ///
    /// Call only after `package` resolved to a continuable outcome.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::EnvironmentBroken` when the module still
    /// cannot be loaded after one resolve-then-load retry, or when the
    /// runtime fails in any way other than "module not found".
    pub fn load(
        &self,
        package: &str,
        module: &str,
        resolver: &DependencyResolver<'_>,
        registry: &mut CapabilityRegistry,
    ) -> Result<LoadReport> {
        let report = match self.attempt(module)? {
            Attempt::Loaded(report) => report,
            Attempt::Failed(message) => return Err(broken(module, &message)),
            Attempt::NotFound(message) => {
                tracing::warn!(
                    "{} not found after resolving {} ({}); re-resolving once",
                    module,
                    package,
                    message
                );
                let outcome = resolver.resolve(package)?;
                if !outcome.can_continue() {
                    return Err(broken(
                        module,
                        &format!("re-resolving '{}' ended as {}", package, outcome.label()),
                    ));
                }
                match self.attempt(module)? {
                    Attempt::Loaded(mut report) => {
                        report.retried = true;
                        report
                    }
                    Attempt::NotFound(message) | Attempt::Failed(message) => {
                        return Err(broken(module, &message));
                    }
                }
            }
        };

        tracing::debug!(
            "Loaded {} ({} modules, {} failed)",
            module,
            report.loaded.len(),
            report.failed.len()
        );
        registry.mark_loaded(report.clone());
        Ok(report)
    }

    fn attempt(&self, module: &str) -> Result<Attempt> {
        let spec = self.runtime.script_command(LOAD_SCRIPT, module);
        let result = self.runner.run(&spec)?;

        if result.exit_code == Some(MODULE_NOT_FOUND_EXIT) {
            return Ok(Attempt::NotFound(result.stderr.trim().to_string()));
        }
        if !result.success {
            return Ok(Attempt::Failed(format!(
                "interpreter exited with {:?}: {}",
                result.exit_code,
                result.stderr.trim()
            )));
        }

        let Some(answer) = last_line(&result.stdout) else {
            return Ok(Attempt::Failed("interpreter produced no output".to_string()));
        };
        match serde_json::from_str::<LoadOutput>(answer) {
            Ok(output) => Ok(Attempt::Loaded(output.into())),
            Err(e) => Ok(Attempt::Failed(format!(
                "unexpected load output '{}': {}",
                answer, e
            ))),
        }
    }
}

fn broken(module: &str, detail: &str) -> InstallerError {
    InstallerError::EnvironmentBroken {
        module: module.to_string(),
        message: format!(
            "{}. The runtime cannot import it even though it is installed; \
             this must be resolved manually before running the installer again",
            detail
        ),
    }
}
