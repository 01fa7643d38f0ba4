//! Application source acquisition.
//!
//! - [`cloner`] - Clone backends (`dulwich` through the runtime, or `git`)
//! - [`fetcher`] - Clean-clone logic with a single stale-tree retry
//! - [`context`] - The fetched tree passed on to the build stage

pub mod cloner;
pub mod context;
pub mod fetcher;

pub use cloner::{CloneError, Cloner, DulwichCloner, GitCloner};
pub use context::BuildContext;
pub use fetcher::SourceFetcher;
