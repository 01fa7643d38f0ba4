//! Install location.

use std::path::{Path, PathBuf};

use crate::config::InstallConfig;
use crate::error::{InstallerError, Result};
use crate::shell::HostOs;

/// Directory name under the home directory used when none is configured.
pub const DEFAULT_INSTALL_DIR: &str = ".selftrack";

/// Where the artifact ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub directory: PathBuf,
    pub executable_name: String,
}

impl InstallTarget {
    /// Resolve the target against the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::HomeDirUnavailable` when the directory needs
    /// the home directory and it cannot be determined.
    pub fn resolve(config: &InstallConfig, output_name: &str, os: &HostOs) -> Result<Self> {
        Self::resolve_with_home(config, output_name, os, dirs::home_dir())
    }

    /// Resolve the target against an explicit home directory.
    pub fn resolve_with_home(
        config: &InstallConfig,
        output_name: &str,
        os: &HostOs,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let directory = match config.directory.as_deref() {
            None => home
                .ok_or(InstallerError::HomeDirUnavailable)?
                .join(DEFAULT_INSTALL_DIR),
            Some(dir) => expand_home(dir, home)?,
        };

        Ok(Self {
            directory,
            executable_name: format!("{}{}", output_name, os.exe_suffix()),
        })
    }

    /// Full path of the installed executable.
    pub fn executable_path(&self) -> PathBuf {
        self.directory.join(&self.executable_name)
    }
}

fn expand_home(dir: &str, home: Option<PathBuf>) -> Result<PathBuf> {
    let Some(rest) = dir.strip_prefix('~') else {
        return Ok(PathBuf::from(dir));
    };
    let home = home.ok_or(InstallerError::HomeDirUnavailable)?;
    let rest = rest.trim_start_matches(['/', '\\']);
    Ok(if rest.is_empty() {
        home
    } else {
        home.join(Path::new(rest))
    })
}
