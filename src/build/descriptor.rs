//! What the packaging tool is asked to build.

use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::fetch::BuildContext;
use crate::shell::HostOs;

/// A directory embedded into the artifact under a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBundle {
    /// Absolute path of the directory in the fetched tree.
    pub source: PathBuf,
    /// Destination label inside the artifact.
    pub label: String,
}

/// Immutable description of one packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub entry_point: PathBuf,
    pub resource_bundles: Vec<ResourceBundle>,
    pub output_name: String,
    pub console_visible: bool,
    /// Separator between a bundle's source and label, chosen from the host OS.
    pub separator: char,
}

impl BuildDescriptor {
    /// Build the descriptor for a fetched tree on a given host.
    pub fn from_config(config: &BuildConfig, ctx: &BuildContext, os: &HostOs) -> Self {
        Self {
            entry_point: config.entry_point.clone(),
            resource_bundles: config
                .resources
                .iter()
                .map(|r| ResourceBundle {
                    source: ctx.resolve(&r.source),
                    label: r.label.clone(),
                })
                .collect(),
            output_name: config.output_name.clone(),
            console_visible: config.console,
            separator: os.path_list_separator(),
        }
    }

    /// Packaging tool arguments.
    ///
    /// The packaging tool splits each `--add-data` value on the separator,
    /// so it has to match the host convention.
    pub fn packager_args(&self) -> Vec<String> {
        let mut args = vec![
            self.entry_point.to_string_lossy().into_owned(),
            "--onefile".to_string(),
        ];
        for bundle in &self.resource_bundles {
            args.push("--add-data".to_string());
            args.push(format!(
                "{}{}{}",
                bundle.source.display(),
                self.separator,
                bundle.label
            ));
        }
        if !self.console_visible {
            args.push("--noconsole".to_string());
        }
        args.push(format!("--name={}", self.output_name));
        args
    }

    /// Where the packaging tool leaves the artifact.
    pub fn artifact_path(&self, ctx: &BuildContext, os: &HostOs) -> PathBuf {
        ctx.resolve("dist")
            .join(format!("{}{}", self.output_name, os.exe_suffix()))
    }
}
