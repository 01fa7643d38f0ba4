//! Library integration tests.

use selftrack_installer::error::exit_codes;
use selftrack_installer::InstallerError;

#[test]
fn error_types_are_public() {
    let err = InstallerError::Fetch {
        url: "https://example.invalid/repo".into(),
        message: "network unreachable".into(),
    };
    assert!(err.to_string().contains("example.invalid"));
    assert_eq!(err.exit_code(), exit_codes::FETCH);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> selftrack_installer::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use selftrack_installer::cli::{Cli, Commands};

    let cli = Cli::parse_from(["selftrack-installer", "config", "--json"]);

    if let Some(Commands::Config(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Config command");
    }
}

#[test]
fn default_config_matches_stock_install() {
    use selftrack_installer::config::{FetchBackend, InstallerConfig};

    let config = InstallerConfig::default();
    let names: Vec<_> = config.dependencies.iter().map(|d| d.name.as_str()).collect();

    assert_eq!(names, ["flask", "requests", "pyinstaller", "dulwich"]);
    assert_eq!(config.source.backend, FetchBackend::Dulwich);
    assert_eq!(config.build.output_name, "SelfTrack");
    assert!(!config.build.console);
}
