//! Run command implementation.
//!
//! Drives the full pipeline and turns its progress events into terminal
//! output: one line per dependency, spinners around the clone and the
//! build, and the packaging tool's output when the build fails.

use std::path::{Path, PathBuf};

use crate::cli::args::RunArgs;
use crate::config::{load_config, ConfigSource, InstallerConfig};
use crate::error::Result;
use crate::requirements::{FailureKind, InstallOutcome, PythonRuntime};
use crate::runner::{Pipeline, PipelineEvent, Stage};
use crate::shell::{host_banner, CommandRunner, HostOs, SystemRunner};
use crate::ui::{SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult, GlobalOptions};

/// The run command implementation.
pub struct RunCommand {
    work_dir: PathBuf,
    globals: GlobalOptions,
    args: RunArgs,
    runner: Box<dyn CommandRunner>,
    home: Option<Option<PathBuf>>,
}

impl RunCommand {
    /// Create a run command that executes real processes.
    pub fn new(work_dir: &Path, globals: GlobalOptions, args: RunArgs) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            globals,
            args,
            runner: Box::new(SystemRunner),
            home: None,
        }
    }

    /// Use a different command runner.
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Override the home directory used for the install location.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = Some(home);
        self
    }

    /// Directory the pipeline clones into and writes diagnostics to.
    fn pipeline_dir(&self) -> PathBuf {
        self.args
            .work_dir
            .clone()
            .unwrap_or_else(|| self.work_dir.clone())
    }

    fn pipeline<'a>(&'a self, config: &'a InstallerConfig) -> Pipeline<'a> {
        let os = HostOs::detect();
        let python = self.globals.python.as_deref().or(config.python.as_deref());
        let runtime = PythonRuntime::discover(python, &os);
        let pipeline = Pipeline::new(config, self.runner.as_ref(), runtime, self.pipeline_dir());
        match &self.home {
            Some(home) => pipeline.with_home(home.clone()),
            None => pipeline,
        }
    }

    fn show_plan(&self, pipeline: &Pipeline<'_>, ui: &mut dyn UserInterface) -> Result<()> {
        ui.show_header("Dry run");
        for step in pipeline.plan()? {
            ui.message(&format!("[{}] {}", step.stage, step.description));
            if let Some(command) = step.command {
                ui.message(&format!("    $ {}", command.display()));
            }
        }
        Ok(())
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (config, source) = load_config(self.globals.config.as_deref(), &self.work_dir)?;
        match &source {
            ConfigSource::File(path) => tracing::debug!("Using config {}", path.display()),
            ConfigSource::Defaults => tracing::debug!("No config file, using defaults"),
        }

        let mut pipeline = self.pipeline(&config);
        tracing::debug!(
            "Python runtime: {}",
            pipeline
                .runtime()
                .location()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| pipeline.runtime().executable().to_string())
        );

        if self.args.dry_run {
            self.show_plan(&pipeline, ui)?;
            return Ok(CommandResult::success());
        }

        std::fs::create_dir_all(self.pipeline_dir())?;
        ui.show_header("Installing SelfTrack");

        let banner = host_banner(pipeline.os());
        let issues = format!("{}/issues", config.source.repository.trim_end_matches('/'));
        let output_name = config.build.output_name.clone();
        let show_build_output = ui.output_mode().shows_command_output();
        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;

        let result = pipeline.run_with_progress(|event| match event {
            PipelineEvent::StageStarting { stage } => match stage {
                Stage::Dependencies => ui.message("Checking dependencies"),
                Stage::Fetch => {
                    spinner = Some(ui.start_spinner(&format!(
                        "Cloning {}",
                        config.source.repository
                    )));
                }
                Stage::Build => {
                    ui.message(&banner);
                    spinner = Some(ui.start_spinner(&format!("Building {}", output_name)));
                }
                Stage::Install => ui.message("Installing"),
            },
            PipelineEvent::DependencyResolved { name, outcome } => {
                report_dependency(ui, name, outcome, &issues);
            }
            PipelineEvent::ModuleLoaded { report } => {
                if report.retried {
                    ui.warning(&format!("{} loaded after reinstalling", report.module));
                }
                for failure in &report.failed {
                    ui.warning(&format!(
                        "{}: subpackage {} could not be imported ({})",
                        report.module, failure.name, failure.error
                    ));
                }
                tracing::debug!(
                    "Loaded {} ({} subpackages)",
                    report.module,
                    report.loaded.len()
                );
            }
            PipelineEvent::SourceFetched { context } => {
                if let Some(mut s) = spinner.take() {
                    s.finish_success(&format!(
                        "Source ready in {}",
                        context.source_root().display()
                    ));
                }
            }
            PipelineEvent::BuildFinished { command, result } => {
                let elapsed = result.elapsed_display();
                if result.success {
                    if let Some(mut s) = spinner.take() {
                        s.finish_success(&format!("Built {} in {}", output_name, elapsed));
                    }
                    if show_build_output && !result.stdout.is_empty() {
                        ui.message(result.stdout.trim_end());
                    }
                } else {
                    if let Some(mut s) = spinner.take() {
                        s.finish_error(&format!("Build failed after {}", elapsed));
                    }
                    let output = [result.stdout.trim_end(), result.stderr.trim_end()]
                        .iter()
                        .filter(|s| !s.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join("\n");
                    ui.show_error_block(
                        &command.display(),
                        &output,
                        Some("The packaging tool output is shown above"),
                    );
                }
            }
            PipelineEvent::Installed { path } => {
                ui.success(&format!(
                    "You can run the application from {}",
                    path.display()
                ));
            }
        });

        if let Some(mut s) = spinner.take() {
            s.finish_error("Failed");
        }

        let report = result?;
        ui.message(&format!(
            "Finished in {}",
            crate::build::format_elapsed(report.elapsed)
        ));
        Ok(CommandResult::success())
    }
}

fn report_dependency(
    ui: &mut dyn UserInterface,
    name: &str,
    outcome: &InstallOutcome,
    issues: &str,
) {
    match outcome {
        InstallOutcome::AlreadyPresent { version } => {
            ui.success(&format!("{} {} already installed", name, version));
        }
        InstallOutcome::Installed { version } => {
            ui.success(&format!("{} {} installed", name, version));
        }
        InstallOutcome::InstalledButUndetected => {
            ui.error(&format!(
                "{} was installed but the runtime cannot find it",
                name
            ));
            ui.show_hint(&format!(
                "Install it manually with `python -m pip install {}` and run the installer again",
                name
            ));
        }
        InstallOutcome::InvalidPackage { .. } => {
            ui.error(&format!("'{}' is not a valid package name", name));
            ui.show_hint(&format!(
                "This is a bug in the installer. Please report it at {}",
                issues
            ));
        }
        InstallOutcome::InstallFailed {
            error_text,
            kind,
            diagnostic_file,
        } => {
            ui.error(&format!("Failed to install {}", name));
            if *kind == FailureKind::PermissionDenied {
                ui.show_hint("Permission denied: retry inside a virtual environment or with --user");
            }
            match diagnostic_file {
                Some(file) => ui.show_hint(&format!(
                    "The error output was saved to {}",
                    file.display()
                )),
                None => ui.show_error_block(
                    &format!("pip install {}", name),
                    error_text.trim_end(),
                    None,
                ),
            }
        }
    }
}
