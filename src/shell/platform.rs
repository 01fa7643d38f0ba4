//! Host platform detection.

use std::path::{Path, PathBuf};

/// Operating system family of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Linux,
    MacOs,
    /// Any other Unix-like system, by its `std::env::consts::OS` name.
    Other(String),
}

impl HostOs {
    /// Detect the OS this binary is running on.
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Parse an OS name as reported by `std::env::consts::OS`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            other => HostOs::Other(other.to_string()),
        }
    }

    /// Whether this is a Windows-family OS.
    pub fn is_windows(&self) -> bool {
        matches!(self, HostOs::Windows)
    }

    /// Separator between source and destination in a packaging-tool
    /// `--add-data` argument.
    pub fn path_list_separator(&self) -> char {
        if self.is_windows() {
            ';'
        } else {
            ':'
        }
    }

    /// Filename suffix of executables.
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// Name shown in the operator banner.
    pub fn display_name(&self) -> String {
        match self {
            HostOs::Windows => "WINDOWS".to_string(),
            HostOs::Linux => "LINUX".to_string(),
            HostOs::MacOs => "MACINTOSH".to_string(),
            HostOs::Other(name) => name.to_uppercase(),
        }
    }

    /// Default interpreter name for the Python runtime.
    pub fn default_python(&self) -> &'static str {
        if self.is_windows() {
            "python"
        } else {
            "python3"
        }
    }
}

/// One-line host description: OS, machine architecture and pointer width.
pub fn host_banner(os: &HostOs) -> String {
    format!(
        "OS TYPE : {} {} {}bit",
        os.display_name(),
        std::env::consts::ARCH,
        usize::BITS
    )
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Absolute or
/// relative paths containing a separator are checked directly.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return (direct.is_file() && is_executable(direct)).then(|| direct.to_path_buf());
    }

    let suffix = HostOs::detect().exe_suffix();
    for dir in path_entries {
        for name in [tool.to_string(), format!("{}{}", tool, suffix)] {
            let candidate = dir.join(&name);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Check if running in a CI environment.
///
/// Spinners are suppressed in CI since they produce noisy logs.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_uses_semicolon_separator() {
        assert_eq!(HostOs::Windows.path_list_separator(), ';');
    }

    #[test]
    fn unix_family_uses_colon_separator() {
        assert_eq!(HostOs::Linux.path_list_separator(), ':');
        assert_eq!(HostOs::MacOs.path_list_separator(), ':');
        assert_eq!(
            HostOs::Other("freebsd".to_string()).path_list_separator(),
            ':'
        );
    }

    #[test]
    fn exe_suffix_only_on_windows() {
        assert_eq!(HostOs::Windows.exe_suffix(), ".exe");
        assert_eq!(HostOs::Linux.exe_suffix(), "");
        assert_eq!(HostOs::MacOs.exe_suffix(), "");
    }

    #[test]
    fn from_name_maps_std_names() {
        assert_eq!(HostOs::from_name("windows"), HostOs::Windows);
        assert_eq!(HostOs::from_name("linux"), HostOs::Linux);
        assert_eq!(HostOs::from_name("macos"), HostOs::MacOs);
        assert_eq!(
            HostOs::from_name("openbsd"),
            HostOs::Other("openbsd".to_string())
        );
    }

    #[test]
    fn display_names_match_banner_convention() {
        assert_eq!(HostOs::MacOs.display_name(), "MACINTOSH");
        assert_eq!(HostOs::Other("netbsd".into()).display_name(), "NETBSD");
    }

    #[test]
    fn banner_mentions_os() {
        assert!(host_banner(&HostOs::Linux).starts_with("OS TYPE : LINUX"));
    }

    #[test]
    fn default_python_per_os() {
        assert_eq!(HostOs::Windows.default_python(), "python");
        assert_eq!(HostOs::Linux.default_python(), "python3");
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_finds_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let tool = temp.path().join("fake-python");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = resolve_tool_path("fake-python", &[temp.path().to_path_buf()]);
        assert_eq!(found, Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_skips_non_executable() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("plain"), "").unwrap();

        assert!(resolve_tool_path("plain", &[temp.path().to_path_buf()]).is_none());
    }

    #[test]
    fn resolve_tool_path_none_when_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(resolve_tool_path("nope", &[temp.path().to_path_buf()]).is_none());
    }
}
