//! External command execution and host platform detection.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{CommandResult, CommandRunner, CommandSpec, SystemRunner};
pub use mock::{failure_output, success_output, MockRunner};
pub use platform::{
    host_banner, is_ci, is_executable, parse_system_path, resolve_tool_path, HostOs,
};
