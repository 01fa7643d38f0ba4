//! Integration tests for the pipeline public API.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use selftrack_installer::config::{FetchBackend, InstallerConfig};
use selftrack_installer::requirements::{InstallOutcome, PythonRuntime};
use selftrack_installer::runner::{Pipeline, PipelineEvent, Stage};
use selftrack_installer::shell::{success_output, HostOs, MockRunner};
use tempfile::TempDir;

fn scripted_runner() -> MockRunner {
    let runner = MockRunner::new();
    runner.respond_with("python", &["-c"], |spec| {
        if spec.args[1].contains("walk_packages") {
            success_output(r#"{"module": "dulwich", "loaded": ["dulwich"], "failed": []}"#)
        } else {
            success_output(r#"{"installed": true, "version": "0.22.1"}"#)
        }
    });
    runner.respond_with("git", &["clone"], |spec| {
        let dest = PathBuf::from(&spec.args[2]);
        std::fs::create_dir_all(dest.join("templates")).unwrap();
        std::fs::create_dir_all(dest.join("static")).unwrap();
        std::fs::write(dest.join("app.py"), "").unwrap();
        success_output("")
    });
    runner.respond_with("python", &["-m", "PyInstaller"], |spec| {
        let dist = spec.cwd.as_ref().unwrap().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("SelfTrack.exe"), "pe").unwrap();
        success_output("")
    });
    runner
}

#[test]
fn stages_run_in_order() {
    let temp = TempDir::new().unwrap();
    let mut config = InstallerConfig::default();
    config.source.backend = FetchBackend::Git;
    let runner = scripted_runner();
    let stages = Rc::new(RefCell::new(Vec::new()));

    let mut pipeline = Pipeline::new(&config, &runner, PythonRuntime::new("python"), temp.path())
        .with_os(HostOs::Windows)
        .with_home(Some(temp.path().join("home")));
    let seen = Rc::clone(&stages);
    let report = pipeline
        .run_with_progress(move |event| {
            if let PipelineEvent::StageStarting { stage } = event {
                seen.borrow_mut().push(stage);
            }
        })
        .unwrap();

    assert_eq!(
        *stages.borrow(),
        [Stage::Dependencies, Stage::Fetch, Stage::Build, Stage::Install]
    );
    assert!(report
        .dependencies
        .iter()
        .all(|(_, outcome)| matches!(outcome, InstallOutcome::AlreadyPresent { .. })));
    assert_eq!(
        report.installed_path,
        std::path::absolute(temp.path().join("home/.selftrack/SelfTrack.exe")).unwrap()
    );
    assert!(runner.was_called("python", &["-m", "PyInstaller"]));
}

#[test]
fn plan_describes_every_stage_without_running() {
    let temp = TempDir::new().unwrap();
    let config = InstallerConfig::default();
    let runner = MockRunner::new();

    let pipeline = Pipeline::new(&config, &runner, PythonRuntime::new("python"), temp.path())
        .with_os(HostOs::Linux)
        .with_home(Some(temp.path().join("home")));
    let steps = pipeline.plan().unwrap();

    assert_eq!(steps.first().unwrap().stage, Stage::Dependencies);
    assert_eq!(steps.last().unwrap().stage, Stage::Install);
    assert_eq!(runner.calls().len(), 0);
}
