//! Bootstrap pipeline.
//!
//! Runs the four stages strictly in order: resolve and load every
//! dependency, fetch the source, build the artifact, install it. The first
//! fatal outcome returns `Err` and nothing after it runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::build::{BuildDescriptor, BuildOrchestrator, BuildResult};
use crate::config::{FetchBackend, InstallerConfig};
use crate::error::{InstallerError, Result};
use crate::fetch::{BuildContext, Cloner, DulwichCloner, GitCloner, SourceFetcher};
use crate::install::{install, InstallTarget};
use crate::requirements::{
    Capability, CapabilityRegistry, DependencyResolver, InstallOutcome, LoadReport, ModuleLoader,
    PythonRuntime,
};
use crate::shell::{CommandRunner, CommandSpec, HostOs};

/// One of the four pipeline phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dependencies,
    Fetch,
    Build,
    Install,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dependencies => write!(f, "dependencies"),
            Stage::Fetch => write!(f, "fetch"),
            Stage::Build => write!(f, "build"),
            Stage::Install => write!(f, "install"),
        }
    }
}

/// Progress events emitted while the pipeline runs.
///
/// Result events are emitted before a failing stage returns its error, so
/// the caller can report the details.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// A stage is about to start.
    StageStarting { stage: Stage },
    /// A dependency was resolved, successfully or not.
    DependencyResolved {
        name: &'a str,
        outcome: &'a InstallOutcome,
    },
    /// A module was loaded into the registry.
    ModuleLoaded { report: &'a LoadReport },
    /// The source tree is in place.
    SourceFetched { context: &'a BuildContext },
    /// The packaging tool finished, successfully or not.
    BuildFinished {
        command: &'a CommandSpec,
        result: &'a BuildResult,
    },
    /// The artifact was copied to its final location.
    Installed { path: &'a Path },
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Resolution outcome per dependency, in declared order.
    pub dependencies: Vec<(String, InstallOutcome)>,
    /// Load reports, in declared order.
    pub loaded: Vec<LoadReport>,
    pub source_root: PathBuf,
    pub build: BuildResult,
    pub installed_path: PathBuf,
    pub elapsed: Duration,
}

/// One entry of a dry-run plan.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub stage: Stage,
    pub description: String,
    /// External command the step would run, if any.
    pub command: Option<CommandSpec>,
}

/// The bootstrap pipeline.
pub struct Pipeline<'a> {
    config: &'a InstallerConfig,
    runner: &'a dyn CommandRunner,
    runtime: PythonRuntime,
    os: HostOs,
    work_dir: PathBuf,
    home: Option<PathBuf>,
    registry: CapabilityRegistry,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline for the detected host, working in `work_dir`.
    pub fn new(
        config: &'a InstallerConfig,
        runner: &'a dyn CommandRunner,
        runtime: PythonRuntime,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            runner,
            runtime,
            os: HostOs::detect(),
            work_dir: work_dir.into(),
            home: dirs::home_dir(),
            registry: CapabilityRegistry::builtin(),
        }
    }

    /// Override the host OS.
    pub fn with_os(mut self, os: HostOs) -> Self {
        self.os = os;
        self
    }

    /// Override the home directory used for the install location.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn os(&self) -> &HostOs {
        &self.os
    }

    pub fn runtime(&self) -> &PythonRuntime {
        &self.runtime
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Where install diagnostics are written.
    pub fn diagnostic_file(&self) -> PathBuf {
        self.work_dir.join(&self.config.diagnostics.error_file)
    }

    /// Where the source tree is cloned.
    pub fn clone_dir(&self) -> PathBuf {
        self.work_dir.join(&self.config.source.directory)
    }

    /// Run every stage.
    pub fn run(&mut self) -> Result<PipelineReport> {
        self.run_with_progress(|_| {})
    }

    /// Run every stage, reporting progress through `on_event`.
    pub fn run_with_progress(
        &mut self,
        mut on_event: impl FnMut(PipelineEvent<'_>),
    ) -> Result<PipelineReport> {
        let start = Instant::now();
        let config = self.config;
        let runner = self.runner;

        on_event(PipelineEvent::StageStarting {
            stage: Stage::Dependencies,
        });
        let resolver = DependencyResolver::new(runner, &self.runtime, self.diagnostic_file());
        let loader = ModuleLoader::new(runner, &self.runtime);
        let mut dependencies = Vec::new();
        let mut loaded = Vec::new();

        for dep in &config.dependencies {
            let outcome = resolver.resolve(&dep.name)?;
            on_event(PipelineEvent::DependencyResolved {
                name: &dep.name,
                outcome: &outcome,
            });
            if outcome.is_terminal() {
                return Err(unresolved(&dep.name, &outcome));
            }

            if let Some(alias) = &dep.import_alias {
                let report = loader.load(&dep.name, alias, &resolver, &mut self.registry)?;
                on_event(PipelineEvent::ModuleLoaded { report: &report });
                loaded.push(report);
            }
            dependencies.push((dep.name.clone(), outcome));
        }

        on_event(PipelineEvent::StageStarting {
            stage: Stage::Fetch,
        });
        let dest = self.clone_dir();
        let context = match config.source.backend {
            FetchBackend::Dulwich => {
                self.registry.require(Capability::SourceClone)?;
                let cloner = DulwichCloner::new(runner, &self.runtime);
                SourceFetcher::new(&cloner).fetch(&config.source.repository, &dest)?
            }
            FetchBackend::Git => {
                let cloner = GitCloner::new(runner);
                SourceFetcher::new(&cloner).fetch(&config.source.repository, &dest)?
            }
        };
        on_event(PipelineEvent::SourceFetched { context: &context });

        on_event(PipelineEvent::StageStarting {
            stage: Stage::Build,
        });
        let descriptor = BuildDescriptor::from_config(&config.build, &context, &self.os);
        let orchestrator = BuildOrchestrator::new(runner, &self.runtime);
        let command = orchestrator.command(&descriptor, &context);
        let build = orchestrator.build(&descriptor, &context)?;
        on_event(PipelineEvent::BuildFinished {
            command: &command,
            result: &build,
        });
        if !build.success {
            return Err(InstallerError::Build {
                output_name: descriptor.output_name.clone(),
                code: build.exit_code,
            });
        }

        on_event(PipelineEvent::StageStarting {
            stage: Stage::Install,
        });
        let target = InstallTarget::resolve_with_home(
            &config.install,
            &config.build.output_name,
            &self.os,
            self.home.clone(),
        )?;
        let artifact = descriptor.artifact_path(&context, &self.os);
        let installed_path = install(&artifact, &target)?;
        on_event(PipelineEvent::Installed {
            path: &installed_path,
        });

        Ok(PipelineReport {
            dependencies,
            loaded,
            source_root: context.source_root().to_path_buf(),
            build,
            installed_path,
            elapsed: start.elapsed(),
        })
    }

    /// Describe what [`run`](Pipeline::run) would do, without doing it.
    ///
    /// Install commands are listed for every dependency even though a run
    /// only issues them for absent packages.
    pub fn plan(&self) -> Result<Vec<PlannedStep>> {
        let config = self.config;
        let mut steps = Vec::new();

        for dep in &config.dependencies {
            steps.push(PlannedStep {
                stage: Stage::Dependencies,
                description: format!("probe {}; install it if absent", dep.name),
                command: Some(self.runtime.module_command("pip", ["install", &dep.name])),
            });
            if let Some(alias) = &dep.import_alias {
                steps.push(PlannedStep {
                    stage: Stage::Dependencies,
                    description: format!("import {} and all of its subpackages", alias),
                    command: None,
                });
            }
        }

        let dest = self.clone_dir();
        let url = &config.source.repository;
        let clone = match config.source.backend {
            FetchBackend::Dulwich => DulwichCloner::new(self.runner, &self.runtime).command(url, &dest),
            FetchBackend::Git => GitCloner::new(self.runner).command(url, &dest),
        };
        steps.push(PlannedStep {
            stage: Stage::Fetch,
            description: format!(
                "clone {} into {} (replacing a stale copy)",
                url,
                dest.display()
            ),
            command: Some(clone),
        });

        let context = BuildContext::new(&dest)?;
        let descriptor = BuildDescriptor::from_config(&config.build, &context, &self.os);
        let orchestrator = BuildOrchestrator::new(self.runner, &self.runtime);
        steps.push(PlannedStep {
            stage: Stage::Build,
            description: format!("package {} as a single file", descriptor.output_name),
            command: Some(orchestrator.command(&descriptor, &context)),
        });

        let target = InstallTarget::resolve_with_home(
            &config.install,
            &config.build.output_name,
            &self.os,
            self.home.clone(),
        )?;
        steps.push(PlannedStep {
            stage: Stage::Install,
            description: format!(
                "copy {} to {}",
                descriptor.artifact_path(&context, &self.os).display(),
                target.executable_path().display()
            ),
            command: None,
        });

        Ok(steps)
    }
}

fn unresolved(name: &str, outcome: &InstallOutcome) -> InstallerError {
    let message = match outcome {
        InstallOutcome::InstalledButUndetected => {
            "the package manager reported success but the runtime cannot find it; \
             install it manually and run the installer again"
                .to_string()
        }
        InstallOutcome::InvalidPackage { .. } => {
            "the package index does not know this name; this is a bug in the installer, \
             please report it"
                .to_string()
        }
        InstallOutcome::InstallFailed {
            diagnostic_file: Some(file),
            ..
        } => format!(
            "installation failed; the error output was saved to {}",
            file.display()
        ),
        InstallOutcome::InstallFailed {
            error_text,
            diagnostic_file: None,
            ..
        } => format!("installation failed: {}", error_text.trim()),
        other => other.label().to_string(),
    };
    InstallerError::DependencyUnresolved {
        package: name.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DependencySpec;
    use crate::error::exit_codes;
    use crate::shell::{failure_output, success_output, MockRunner};
    use tempfile::TempDir;

    const DULWICH_LOADED: &str =
        r#"{"module": "dulwich", "loaded": ["dulwich", "dulwich.porcelain"], "failed": []}"#;
    const PRESENT: &str = r#"{"installed": true, "version": "1.0"}"#;
    const ABSENT: &str = r#"{"installed": false, "version": null}"#;

    fn is_load(spec: &CommandSpec) -> bool {
        spec.args.get(1).is_some_and(|s| s.contains("walk_packages"))
    }

    /// Every package present except those in `absent`.
    fn script_runtime(runner: &MockRunner, absent: &'static [&'static str]) {
        runner.respond_with("python3", &["-c"], move |spec| {
            if is_load(spec) {
                return success_output(DULWICH_LOADED);
            }
            let name = spec.args.last().map(String::as_str).unwrap_or_default();
            if absent.contains(&name) {
                success_output(ABSENT)
            } else {
                success_output(PRESENT)
            }
        });
    }

    /// Clones create a tree with an entry point and resource directories.
    fn script_clone(runner: &MockRunner) {
        runner.respond_with("python3", &["-m", "dulwich", "clone"], |spec| {
            let dest = PathBuf::from(&spec.args[4]);
            std::fs::create_dir_all(dest.join("templates")).unwrap();
            std::fs::create_dir_all(dest.join("static")).unwrap();
            std::fs::write(dest.join("app.py"), "app = None").unwrap();
            success_output("")
        });
    }

    /// Builds write the artifact where the packaging tool would.
    fn script_build(runner: &MockRunner) {
        runner.respond_with("python3", &["-m", "PyInstaller"], |spec| {
            let dist = spec.cwd.as_ref().unwrap().join("dist");
            std::fs::create_dir_all(&dist).unwrap();
            std::fs::write(dist.join("SelfTrack"), "elf").unwrap();
            std::fs::write(dist.join("SelfTrack.exe"), "pe").unwrap();
            success_output("Building EXE completed successfully.")
        });
    }

    fn pipeline<'a>(
        config: &'a InstallerConfig,
        runner: &'a MockRunner,
        temp: &TempDir,
    ) -> Pipeline<'a> {
        Pipeline::new(
            config,
            runner,
            PythonRuntime::new("python3"),
            temp.path().join("work"),
        )
        .with_os(HostOs::Linux)
        .with_home(Some(temp.path().join("home")))
    }

    fn setup_work_dir(temp: &TempDir) {
        std::fs::create_dir_all(temp.path().join("work")).unwrap();
    }

    #[test]
    fn all_present_runs_every_stage() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        script_clone(&runner);
        script_build(&runner);
        let config = InstallerConfig::default();
        let mut stages = Vec::new();
        let mut resolved = 0;
        let mut loaded = 0;

        let report = pipeline(&config, &runner, &temp)
            .run_with_progress(|event| match event {
                PipelineEvent::StageStarting { stage } => stages.push(stage),
                PipelineEvent::DependencyResolved { outcome, .. } => {
                    assert!(matches!(outcome, InstallOutcome::AlreadyPresent { .. }));
                    resolved += 1;
                }
                PipelineEvent::ModuleLoaded { .. } => loaded += 1,
                _ => {}
            })
            .unwrap();

        assert_eq!(resolved, 4);
        assert_eq!(loaded, 1);
        assert_eq!(
            stages,
            [Stage::Dependencies, Stage::Fetch, Stage::Build, Stage::Install]
        );
        assert!(!runner.was_called("python3", &["-m", "pip"]));
        assert_eq!(
            report.installed_path,
            temp.path().join("home").join(".selftrack").join("SelfTrack")
        );
        assert!(report.installed_path.exists());
        assert_eq!(report.source_root, temp.path().join("work").join("source"));
    }

    #[test]
    fn every_declared_alias_is_loaded() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        script_clone(&runner);
        script_build(&runner);
        let config = InstallerConfig::default();
        let aliases = config
            .dependencies
            .iter()
            .filter(|d| d.import_alias.is_some())
            .count();

        let mut p = pipeline(&config, &runner, &temp);
        let report = p.run().unwrap();

        assert_eq!(report.loaded.len(), aliases);
        assert!(p.registry().is_loaded("dulwich"));
    }

    #[test]
    fn misspelled_package_aborts_before_fetch() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &["flaskk"]);
        runner.respond(
            "python3",
            &["-m", "pip", "install"],
            failure_output(1, "ERROR: No matching distribution found for flaskk"),
        );
        script_clone(&runner);
        script_build(&runner);
        let config = InstallerConfig {
            dependencies: vec![
                DependencySpec::new("flaskk"),
                DependencySpec::with_import("dulwich", "dulwich"),
            ],
            ..Default::default()
        };

        let err = pipeline(&config, &runner, &temp).run().unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::DEPENDENCY);
        assert!(err.to_string().contains("report"));
        assert!(!runner.was_called("python3", &["-m", "dulwich"]));
        assert!(!runner.was_called("python3", &["-m", "PyInstaller"]));
        assert!(!temp.path().join("work").join("source").exists());
        assert!(!temp.path().join("home").exists());
    }

    #[test]
    fn undetected_install_halts_pipeline() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &["requests"]);
        runner.respond("python3", &["-m", "pip", "install"], success_output(""));
        script_clone(&runner);
        let config = InstallerConfig::default();

        let err = pipeline(&config, &runner, &temp).run().unwrap_err();

        assert!(matches!(err, InstallerError::DependencyUnresolved { ref package, .. } if package == "requests"));
        assert!(err.to_string().contains("manually"));
        assert!(!runner.was_called("python3", &["-m", "dulwich"]));
    }

    #[test]
    fn failed_install_writes_diagnostic_in_work_dir() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &["flask"]);
        runner.respond(
            "python3",
            &["-m", "pip", "install"],
            failure_output(1, "ERROR: subprocess-exited-with-error"),
        );
        let config = InstallerConfig::default();

        let err = pipeline(&config, &runner, &temp).run().unwrap_err();

        let error_file = temp.path().join("work").join("error.txt");
        assert_eq!(
            std::fs::read_to_string(&error_file).unwrap(),
            "ERROR: subprocess-exited-with-error"
        );
        assert!(err.to_string().contains("error.txt"));
    }

    #[test]
    fn unwritable_diagnostic_still_exits_with_dependency_code() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &["flask"]);
        runner.respond(
            "python3",
            &["-m", "pip", "install"],
            failure_output(1, "ERROR: subprocess-exited-with-error"),
        );
        let mut config = InstallerConfig::default();
        config.diagnostics.error_file = "no-such-dir/error.txt".to_string();

        let err = pipeline(&config, &runner, &temp).run().unwrap_err();

        assert!(matches!(err, InstallerError::DependencyUnresolved { .. }));
        assert_eq!(err.exit_code(), exit_codes::DEPENDENCY);
        assert!(err.to_string().contains("subprocess-exited-with-error"));
    }

    #[test]
    fn build_failure_is_fatal_and_skips_install() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        script_clone(&runner);
        runner.respond(
            "python3",
            &["-m", "PyInstaller"],
            failure_output(1, "ERROR: Script file 'app.py' does not exist."),
        );
        let config = InstallerConfig::default();
        let mut saw_failed_build = false;

        let err = pipeline(&config, &runner, &temp)
            .run_with_progress(|event| {
                if let PipelineEvent::BuildFinished { result, .. } = event {
                    saw_failed_build = !result.success && result.stderr.contains("app.py");
                }
            })
            .unwrap_err();

        assert!(saw_failed_build);
        assert_eq!(err.exit_code(), exit_codes::BUILD);
        assert_eq!(runner.count("python3", &["-m", "PyInstaller"]), 1);
        assert!(!temp.path().join("home").join(".selftrack").exists());
    }

    #[test]
    fn dulwich_backend_requires_loaded_cloner() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        let config = InstallerConfig {
            dependencies: vec![DependencySpec::new("flask")],
            ..Default::default()
        };

        let err = pipeline(&config, &runner, &temp).run().unwrap_err();

        assert!(matches!(err, InstallerError::CapabilityUnavailable { .. }));
        assert_eq!(err.exit_code(), exit_codes::ENVIRONMENT);
        assert!(!runner.was_called("python3", &["-m", "dulwich"]));
    }

    #[test]
    fn git_backend_clones_without_dulwich() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        runner.respond_with("git", &["clone"], |spec| {
            std::fs::create_dir_all(PathBuf::from(&spec.args[2])).unwrap();
            success_output("")
        });
        script_build(&runner);
        let mut config = InstallerConfig {
            dependencies: vec![DependencySpec::new("flask")],
            ..Default::default()
        };
        config.source.backend = FetchBackend::Git;

        pipeline(&config, &runner, &temp).run().unwrap();
        assert_eq!(runner.count("git", &["clone"]), 1);
    }

    #[test]
    fn windows_build_uses_semicolon_and_exe() {
        let temp = TempDir::new().unwrap();
        setup_work_dir(&temp);
        let runner = MockRunner::new();
        script_runtime(&runner, &[]);
        script_clone(&runner);
        script_build(&runner);
        let config = InstallerConfig::default();

        let report = pipeline(&config, &runner, &temp)
            .with_os(HostOs::Windows)
            .run()
            .unwrap();

        let build = runner
            .calls()
            .into_iter()
            .find(|c| c.args.get(1).map(String::as_str) == Some("PyInstaller"))
            .unwrap();
        assert!(build.args.iter().any(|a| a.ends_with(";templates")));
        assert!(!build.args.iter().any(|a| a.ends_with(":templates")));
        assert!(report.installed_path.ends_with("SelfTrack.exe"));
    }

    #[test]
    fn plan_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let config = InstallerConfig::default();

        let steps = pipeline(&config, &runner, &temp).plan().unwrap();

        assert!(runner.calls().is_empty());
        assert_eq!(
            steps.iter().filter(|s| s.stage == Stage::Dependencies).count(),
            5
        );
        let clone = steps.iter().find(|s| s.stage == Stage::Fetch).unwrap();
        assert_eq!(
            clone.command.as_ref().unwrap().args[..3],
            ["-m", "dulwich", "clone"]
        );
        assert_eq!(steps.last().unwrap().stage, Stage::Install);
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::Dependencies.to_string(), "dependencies");
        assert_eq!(Stage::Install.to_string(), "install");
    }
}
