//! Source fetcher.

use std::path::Path;

use crate::error::{InstallerError, Result};

use super::cloner::{CloneError, Cloner};
use super::context::BuildContext;

/// Obtains a clean copy of the application source.
pub struct SourceFetcher<'a> {
    cloner: &'a dyn Cloner,
}

impl<'a> SourceFetcher<'a> {
    /// Create a fetcher using the given clone backend.
    pub fn new(cloner: &'a dyn Cloner) -> Self {
        Self { cloner }
    }

    /// Clone `url` into `dest` and return the resulting [`BuildContext`].
    ///
    /// A stale `dest` from an earlier run is removed and the clone retried
    /// exactly once. Any other clone failure is fatal.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::Fetch` when the clone fails or the stale tree
    /// cannot be removed, and `InstallerError::Spawn` when the clone tool
    /// cannot be launched.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<BuildContext> {
        match self.cloner.clone_repo(url, dest) {
            Ok(()) => {}
            Err(CloneError::DestinationExists(stale)) => {
                tracing::info!("Removing stale source tree at {}", stale.display());
                std::fs::remove_dir_all(&stale).map_err(|e| InstallerError::Fetch {
                    url: url.to_string(),
                    message: format!("could not remove {}: {}", stale.display(), e),
                })?;
                self.cloner
                    .clone_repo(url, dest)
                    .map_err(|e| fetch_error(url, e))?;
            }
            Err(e) => return Err(fetch_error(url, e)),
        }

        tracing::debug!("Fetched {} into {}", url, dest.display());
        Ok(BuildContext::new(dest)?)
    }
}

fn fetch_error(url: &str, err: CloneError) -> InstallerError {
    match err {
        CloneError::Launch(inner) => inner,
        other => InstallerError::Fetch {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
