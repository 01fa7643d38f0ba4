//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Dependency names are non-empty and unique
//! - Import aliases, when given, are non-empty
//! - Source, build and resource settings are non-empty
//! - The `dulwich` backend has a dependency that loads `dulwich`

use crate::config::schema::{FetchBackend, InstallerConfig};
use crate::error::{InstallerError, Result};
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &InstallerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_dependencies(config));
    errors.extend(validate_source(config));
    errors.extend(validate_build(config));

    if config.diagnostics.error_file.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-error-file",
            "diagnostics.error_file must not be empty",
        ));
    }

    errors
}

/// Validate and convert the collected errors into a single `InstallerError`.
pub fn validate(config: &InstallerConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("[{}] {}", e.rule, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(InstallerError::ConfigValidationError { message })
}

fn validate_dependencies(config: &InstallerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for dep in &config.dependencies {
        let name = dep.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                "empty-dependency",
                "Dependency names must not be empty",
            ));
            continue;
        }

        if !seen.insert(name.to_lowercase()) {
            errors.push(ValidationError::new(
                "duplicate-dependency",
                format!("Dependency '{}' is declared more than once", name),
            ));
        }

        if let Some(alias) = &dep.import_alias {
            if alias.trim().is_empty() {
                errors.push(ValidationError::new(
                    "empty-import",
                    format!("Dependency '{}' has an empty import alias", name),
                ));
            }
        }
    }

    errors
}

fn validate_source(config: &InstallerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.source.repository.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-repository",
            "source.repository must not be empty",
        ));
    }

    if config.source.directory.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "empty-clone-directory",
            "source.directory must not be empty",
        ));
    }

    if config.source.backend == FetchBackend::Dulwich
        && !config
            .dependencies
            .iter()
            .any(|d| d.import_alias.as_deref() == Some("dulwich"))
    {
        errors.push(ValidationError::new(
            "missing-clone-capability",
            "source.backend 'dulwich' requires a dependency with 'import: dulwich'",
        ));
    }

    errors
}

fn validate_build(config: &InstallerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.build.entry_point.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "empty-entry-point",
            "build.entry_point must not be empty",
        ));
    }

    if config.build.output_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-output-name",
            "build.output_name must not be empty",
        ));
    }

    for (index, resource) in config.build.resources.iter().enumerate() {
        if resource.source.as_os_str().is_empty() || resource.label.trim().is_empty() {
            errors.push(ValidationError::new(
                "incomplete-resource",
                format!("build.resources[{}] needs both 'source' and 'label'", index),
            ));
        }
    }

    errors
}
