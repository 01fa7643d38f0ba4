//! Install failure signatures.
//!
//! The package manager only reports *why* an install failed through the
//! wording of its error stream. All knowledge of that wording lives here:
//! a versioned table of named signatures matched against stderr, consulted
//! through [`classify_install_failure`].
//!
//! Bump [`SIGNATURE_SET_VERSION`] whenever a signature is added, removed or
//! reworded so that diagnostics can be traced back to the table in effect.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Version of the built-in signature table.
pub const SIGNATURE_SET_VERSION: u32 = 2;

/// What a failed install most likely means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The package index has no distribution under this name.
    InvalidPackage,
    /// The installer was not allowed to write to the target environment.
    PermissionDenied,
    /// Nothing recognised.
    Unknown,
}

/// A registered failure signature.
#[derive(Debug)]
pub struct FailureSignature {
    /// Signature name (for debugging).
    pub name: &'static str,
    /// Case-insensitive regex matched against stderr.
    pub pattern: &'static str,
    /// Classification when the pattern matches.
    pub kind: FailureKind,
}

/// All built-in signatures, in match priority order.
pub fn built_in_signatures() -> &'static [FailureSignature] {
    &[
        FailureSignature {
            name: "pip-no-matching-distribution",
            pattern: r"no matching distribution found",
            kind: FailureKind::InvalidPackage,
        },
        FailureSignature {
            name: "pip-permission-denied",
            pattern: r"permission denied|\[errno 13\]",
            kind: FailureKind::PermissionDenied,
        },
    ]
}

static COMPILED: LazyLock<Vec<(FailureKind, Regex)>> = LazyLock::new(|| {
    built_in_signatures()
        .iter()
        .filter_map(|sig| {
            RegexBuilder::new(sig.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| tracing::warn!("Signature '{}' failed to compile: {}", sig.name, e))
                .ok()
                .map(|re| (sig.kind, re))
        })
        .collect()
});

/// Classify the error stream of a failed install.
///
/// The first matching signature wins.
pub fn classify_install_failure(stderr: &str) -> FailureKind {
    COMPILED
        .iter()
        .find(|(_, re)| re.is_match(stderr))
        .map(|(kind, _)| *kind)
        .unwrap_or(FailureKind::Unknown)
}
