//! Scripted command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without launching processes.
//! Responses are matched by program name and argument prefix, and every
//! invocation is recorded for later assertion.
//!
//! # Example
//!
//! ```
//! use selftrack_installer::shell::{success_output, CommandRunner, CommandSpec, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.respond("git", &["clone"], success_output(""));
//!
//! let spec = CommandSpec::new("git").args(["clone", "https://example.com/repo", "source"]);
//! assert!(runner.run(&spec).unwrap().success);
//! assert_eq!(runner.count("git", &["clone"]), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{InstallerError, Result};

use super::command::{CommandResult, CommandRunner, CommandSpec};

/// Dynamic response computed from the invocation.
pub type ResponseFn = Rc<dyn Fn(&CommandSpec) -> CommandResult>;

#[derive(Clone)]
enum Response {
    Fixed(CommandResult),
    Computed(ResponseFn),
    SpawnError(std::io::ErrorKind),
}

struct Rule {
    program: String,
    prefix: Vec<String>,
    response: Response,
    once: bool,
    used: bool,
}

impl Rule {
    fn matches(&self, spec: &CommandSpec) -> bool {
        spec.program == self.program
            && spec.args.len() >= self.prefix.len()
            && spec.args.iter().zip(&self.prefix).all(|(a, p)| a == p)
    }
}

/// Command runner that returns scripted results.
#[derive(Default)]
pub struct MockRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl MockRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, program: &str, prefix: &[&str], response: Response, once: bool) {
        self.rules.borrow_mut().push(Rule {
            program: program.to_string(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
            once,
            used: false,
        });
    }

    /// Always answer matching invocations with `result`.
    ///
    /// When several persistent rules match, the most recently added wins.
    pub fn respond(&self, program: &str, prefix: &[&str], result: CommandResult) {
        self.push(program, prefix, Response::Fixed(result), false);
    }

    /// Answer the next matching invocation with `result`, then fall through.
    ///
    /// One-shot rules are consumed in the order they were added and take
    /// precedence over persistent rules.
    pub fn respond_once(&self, program: &str, prefix: &[&str], result: CommandResult) {
        self.push(program, prefix, Response::Fixed(result), true);
    }

    /// Always answer matching invocations by calling `f`.
    pub fn respond_with<F>(&self, program: &str, prefix: &[&str], f: F)
    where
        F: Fn(&CommandSpec) -> CommandResult + 'static,
    {
        self.push(program, prefix, Response::Computed(Rc::new(f)), false);
    }

    /// Make matching invocations fail to launch.
    pub fn fail_to_spawn(&self, program: &str, prefix: &[&str], kind: std::io::ErrorKind) {
        self.push(program, prefix, Response::SpawnError(kind), false);
    }

    /// All recorded invocations, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Number of recorded invocations matching a program and argument prefix.
    pub fn count(&self, program: &str, prefix: &[&str]) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| {
                c.program == program
                    && c.args.len() >= prefix.len()
                    && c.args.iter().zip(prefix).all(|(a, p)| a == p)
            })
            .count()
    }

    /// Whether any invocation matched a program and argument prefix.
    pub fn was_called(&self, program: &str, prefix: &[&str]) -> bool {
        self.count(program, prefix) > 0
    }

    fn next_response(&self, spec: &CommandSpec) -> Option<Response> {
        let mut rules = self.rules.borrow_mut();

        if let Some(rule) = rules
            .iter_mut()
            .find(|r| r.once && !r.used && r.matches(spec))
        {
            rule.used = true;
            return Some(rule.response.clone());
        }

        rules
            .iter()
            .rev()
            .find(|r| !r.once && r.matches(spec))
            .map(|r| r.response.clone())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self.calls.borrow_mut().push(spec.clone());

        match self.next_response(spec) {
            Some(Response::Fixed(result)) => Ok(result),
            Some(Response::Computed(f)) => Ok(f(spec)),
            Some(Response::SpawnError(kind)) => Err(InstallerError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(kind, "mock spawn failure"),
            }),
            None => Ok(failure_output(
                127,
                &format!("mock: no response scripted for '{}'", spec.display()),
            )),
        }
    }
}

/// A successful result with the given stdout.
pub fn success_output(stdout: &str) -> CommandResult {
    CommandResult::success(stdout.to_string(), String::new(), Duration::ZERO)
}

/// A failed result with the given exit code and stderr.
pub fn failure_output(code: i32, stderr: &str) -> CommandResult {
    CommandResult::failure(Some(code), String::new(), stderr.to_string(), Duration::ZERO)
}
