//! Build orchestrator.
//!
//! Runs the packaging tool against the fetched tree and times it. A failed
//! build is never retried; the same tree would fail the same way.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::fetch::BuildContext;
use crate::requirements::PythonRuntime;
use crate::shell::{CommandRunner, CommandSpec};

use super::descriptor::BuildDescriptor;

/// Module name of the packaging tool inside the runtime.
pub const PACKAGER_MODULE: &str = "PyInstaller";

/// Outcome of one packaging run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl BuildResult {
    /// Elapsed time as `N Min M sec`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// Format a duration as whole minutes and seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{} Min {} sec", secs / 60, secs % 60)
}

/// Invokes the packaging tool.
pub struct BuildOrchestrator<'a> {
    runner: &'a dyn CommandRunner,
    runtime: &'a PythonRuntime,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, runtime: &'a PythonRuntime) -> Self {
        Self { runner, runtime }
    }

    /// Command line for a descriptor, run from the source root.
    pub fn command(&self, descriptor: &BuildDescriptor, ctx: &BuildContext) -> CommandSpec {
        self.runtime
            .module_command(PACKAGER_MODULE, descriptor.packager_args())
            .current_dir(ctx.source_root())
    }

    /// Run the build.
    ///
    /// A tool that runs and fails is `Ok` with `success == false`; the
    /// caller decides how to report it. `Err` means the tool never started.
    pub fn build(&self, descriptor: &BuildDescriptor, ctx: &BuildContext) -> Result<BuildResult> {
        let spec = self.command(descriptor, ctx);
        tracing::info!("Building {} with {}", descriptor.output_name, spec.display());

        let started = Instant::now();
        let result = self.runner.run(&spec)?;
        let elapsed = started.elapsed();

        tracing::debug!(
            "Packager exited with {:?} after {:?}",
            result.exit_code,
            elapsed
        );

        Ok(BuildResult {
            success: result.success,
            exit_code: result.exit_code,
            elapsed,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }
}
