//! The Python runtime that dependencies are resolved into.

use std::path::PathBuf;

use crate::shell::{parse_system_path, resolve_tool_path, CommandSpec, HostOs};

/// Handle on an external Python interpreter.
///
/// The installer never embeds the interpreter; every probe, install and
/// load is a subprocess built from this handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRuntime {
    executable: String,
}

impl PythonRuntime {
    /// Use a specific interpreter (name on PATH or path).
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Pick the interpreter: an explicit choice, else the platform default.
    pub fn discover(explicit: Option<&str>, os: &HostOs) -> Self {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(exe) => Self::new(exe),
            None => Self::new(os.default_python()),
        }
    }

    /// Interpreter name or path as configured.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Where the interpreter resolves on PATH, if it does.
    pub fn location(&self) -> Option<PathBuf> {
        resolve_tool_path(&self.executable, &parse_system_path())
    }

    /// `<python> -m <module> <args...>`
    pub fn module_command<I, S>(&self, module: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.executable)
            .args(["-m", module])
            .args(args)
    }

    /// `<python> -c <script> <arg>`; the script sees `arg` as `sys.argv[1]`.
    pub fn script_command(&self, script: &str, arg: &str) -> CommandSpec {
        CommandSpec::new(&self.executable).args(["-c", script, arg])
    }
}

/// Extract the last non-empty line of interpreter output.
///
/// Imported modules may print on stdout; the helper scripts always emit
/// their JSON answer last.
pub(crate) fn last_line(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).rfind(|l| !l.is_empty())
}
