//! External command execution.
//!
//! Every subprocess the installer launches (the Python runtime, git, the
//! packaging tool) goes through a [`CommandRunner`], so stages can be
//! exercised in tests with [`MockRunner`](super::MockRunner).

use crate::error::{InstallerError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to launch (resolved through PATH when not absolute).
    pub program: String,

    /// Arguments, passed verbatim without shell interpretation.
    pub args: Vec<String>,

    /// Working directory for the child (None = inherit).
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a command for a program with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child in the given directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Render the command line for display.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Run a command to completion, capturing stdout and stderr as text.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::Spawn` when the program cannot be launched.
    /// A program that runs and exits non-zero is `Ok` with `success == false`.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        tracing::debug!("Running: {}", spec.display());
        let start = Instant::now();

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null());

        let output = cmd.output().map_err(|source| InstallerError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        tracing::debug!(
            "'{}' exited with {:?} after {:?}",
            spec.program,
            output.status.code(),
            duration
        );

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            Ok(CommandResult::failure(
                output.status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_collects_arguments() {
        let spec = CommandSpec::new("python3")
            .arg("-m")
            .args(["pip", "install", "flask"])
            .current_dir("/tmp");

        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, vec!["-m", "pip", "install", "flask"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("git").args(["clone", "url", "my dir"]);
        assert_eq!(spec.display(), "git clone url \"my dir\"");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let spec = CommandSpec::new("sh").args(["-c", "echo hello"]);
        let result = SystemRunner.run(&spec).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_failure_with_stderr() {
        let spec = CommandSpec::new("sh").args(["-c", "echo broken >&2; exit 3"]);
        let result = SystemRunner.run(&spec).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert!(result.stderr.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_honours_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let spec = CommandSpec::new("pwd").current_dir(temp.path());
        let result = SystemRunner.run(&spec).unwrap();

        assert!(result.success);
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp.path()).unwrap());
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-xyz");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err, InstallerError::Spawn { .. }));
    }
}
