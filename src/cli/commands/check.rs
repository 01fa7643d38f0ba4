//! Check command implementation.
//!
//! Probes every configured dependency without installing anything.

use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::error::Result;
use crate::requirements::{PackageProber, PythonRuntime};
use crate::shell::{CommandRunner, HostOs, SystemRunner};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};

/// The check command implementation.
pub struct CheckCommand {
    work_dir: PathBuf,
    globals: GlobalOptions,
    runner: Box<dyn CommandRunner>,
}

impl CheckCommand {
    pub fn new(work_dir: &Path, globals: GlobalOptions) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            globals,
            runner: Box::new(SystemRunner),
        }
    }

    /// Use a different command runner.
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (config, _) = load_config(self.globals.config.as_deref(), &self.work_dir)?;
        let python = self.globals.python.as_deref().or(config.python.as_deref());
        let runtime = PythonRuntime::discover(python, &HostOs::detect());

        match runtime.location() {
            Some(path) => ui.message(&format!("Python runtime: {}", path.display())),
            None => ui.warning(&format!("{} was not found on PATH", runtime.executable())),
        }

        let prober = PackageProber::new(self.runner.as_ref(), &runtime);
        let mut missing = 0;
        for dep in &config.dependencies {
            let probe = prober.probe(&dep.name)?;
            if probe.installed {
                ui.success(&format!("{} {}", dep.name, probe.version_or_unknown()));
            } else {
                missing += 1;
                ui.warning(&format!("{} is not installed", dep.name));
            }
        }

        if missing == 0 {
            Ok(CommandResult::success())
        } else {
            ui.show_hint("Run `selftrack-installer run` to install missing dependencies");
            Ok(CommandResult::failure(1))
        }
    }
}
