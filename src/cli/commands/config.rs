//! Config command implementation.
//!
//! `selftrack-installer config` shows the effective configuration.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigArgs;
use crate::config::{load_config, ConfigSource};
use crate::error::{InstallerError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};

/// The config command implementation.
pub struct ConfigCommand {
    work_dir: PathBuf,
    globals: GlobalOptions,
    args: ConfigArgs,
}

impl ConfigCommand {
    pub fn new(work_dir: &Path, globals: GlobalOptions, args: ConfigArgs) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            globals,
            args,
        }
    }

    /// Render the effective configuration.
    pub fn render(&self) -> Result<String> {
        let (config, source) = load_config(self.globals.config.as_deref(), &self.work_dir)?;

        let origin = match source {
            ConfigSource::File(path) => format!("# {}", path.display()),
            ConfigSource::Defaults => "# built-in defaults".to_string(),
        };
        let body = if self.args.json {
            serde_json::to_string_pretty(&config).map_err(|e| InstallerError::Other(e.into()))?
        } else {
            serde_yaml::to_string(&config).map_err(|e| InstallerError::Other(e.into()))?
        };

        Ok(if self.args.json {
            body
        } else {
            format!("{}\n{}", origin, body)
        })
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&self.render()?);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn defaults_render_as_yaml() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(temp.path(), GlobalOptions::default(), ConfigArgs::default());

        let out = cmd.render().unwrap();

        assert!(out.starts_with("# built-in defaults"));
        assert!(out.contains("pyinstaller"));
        assert!(out.contains("SelfTrack"));
    }

    #[test]
    fn json_output_parses() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(
            temp.path(),
            GlobalOptions::default(),
            ConfigArgs { json: true },
        );

        let out = cmd.render().unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["build"]["output_name"], "SelfTrack");
    }

    #[test]
    fn file_in_work_dir_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("selftrack-installer.yml"),
            "build:\n  output_name: Tracker\n",
        )
        .unwrap();
        let cmd = ConfigCommand::new(temp.path(), GlobalOptions::default(), ConfigArgs::default());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_message("selftrack-installer.yml"));
        assert!(ui.has_message("Tracker"));
    }

    #[test]
    fn missing_explicit_config_is_error() {
        let temp = TempDir::new().unwrap();
        let globals = GlobalOptions {
            config: Some(temp.path().join("nope.yml")),
            python: None,
        };
        let cmd = ConfigCommand::new(temp.path(), globals, ConfigArgs::default());

        assert!(matches!(
            cmd.render().unwrap_err(),
            InstallerError::ConfigNotFound { .. }
        ));
    }
}
