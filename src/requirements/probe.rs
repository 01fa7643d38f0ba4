//! Dependency prober.
//!
//! Asks the runtime's package metadata registry whether a distribution is
//! installed. Probing has no side effects and a missing package is a
//! normal negative result, not an error.

use crate::error::{InstallerError, Result};
use crate::shell::CommandRunner;

use super::runtime::{last_line, PythonRuntime};
use super::status::ProbeResult;

/// Script run by the interpreter; prints one JSON object.
const PROBE_SCRIPT: &str = r#"
import json, sys
from importlib import metadata
try:
    version = metadata.version(sys.argv[1])
except metadata.PackageNotFoundError:
    print(json.dumps({"installed": False, "version": None}))
else:
    print(json.dumps({"installed": True, "version": version}))
"#;

/// Probes a [`PythonRuntime`] for installed distributions.
pub struct PackageProber<'a> {
    runner: &'a dyn CommandRunner,
    runtime: &'a PythonRuntime,
}

impl<'a> PackageProber<'a> {
    /// Create a prober for a runtime.
    pub fn new(runner: &'a dyn CommandRunner, runtime: &'a PythonRuntime) -> Self {
        Self { runner, runtime }
    }

    /// Check whether `name` is installed and report its version.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::Spawn` if the interpreter cannot be launched
    /// and `InstallerError::Probe` if it fails or answers with garbage.
    pub fn probe(&self, name: &str) -> Result<ProbeResult> {
        let spec = self.runtime.script_command(PROBE_SCRIPT, name);
        let result = self.runner.run(&spec)?;

        if !result.success {
            return Err(InstallerError::Probe {
                package: name.to_string(),
                message: format!(
                    "interpreter exited with {:?}: {}",
                    result.exit_code,
                    result.stderr.trim()
                ),
            });
        }

        let answer = last_line(&result.stdout).ok_or_else(|| InstallerError::Probe {
            package: name.to_string(),
            message: "interpreter produced no output".to_string(),
        })?;

        let probe: ProbeResult =
            serde_json::from_str(answer).map_err(|e| InstallerError::Probe {
                package: name.to_string(),
                message: format!("unexpected probe output '{}': {}", answer, e),
            })?;

        tracing::debug!(
            "Probe {}: installed={} version={:?}",
            name,
            probe.installed,
            probe.version
        );
        Ok(probe)
    }
}
