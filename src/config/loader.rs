//! Configuration file discovery and loading.

use crate::config::schema::InstallerConfig;
use crate::config::validator::validate;
use crate::error::{InstallerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "selftrack-installer.yml";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from a file.
    File(PathBuf),
    /// No file found; built-in defaults.
    Defaults,
}

/// Find the config file to use.
///
/// An explicit path must exist. Otherwise `selftrack-installer.yml` in
/// `work_dir` is used when present.
pub fn discover(explicit: Option<&Path>, work_dir: &Path) -> Result<ConfigSource> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(ConfigSource::File(path.to_path_buf()));
        }
        return Err(InstallerError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let candidate = work_dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        Ok(ConfigSource::File(candidate))
    } else {
        Ok(ConfigSource::Defaults)
    }
}

/// Parse configuration from YAML text.
pub fn parse_config(content: &str, path: &Path) -> Result<InstallerConfig> {
    if content.trim().is_empty() {
        return Ok(InstallerConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| InstallerError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<InstallerConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            InstallerError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            InstallerError::Io(e)
        }
    })?;
    parse_config(&content, path)
}

/// Discover, load and validate the effective configuration.
pub fn load_config(explicit: Option<&Path>, work_dir: &Path) -> Result<(InstallerConfig, ConfigSource)> {
    let source = discover(explicit, work_dir)?;
    let config = match &source {
        ConfigSource::File(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        ConfigSource::Defaults => {
            tracing::debug!("No config file found; using built-in defaults");
            InstallerConfig::default()
        }
    };
    validate(&config)?;
    Ok((config, source))
}
