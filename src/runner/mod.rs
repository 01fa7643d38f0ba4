//! Pipeline orchestration.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineEvent, PipelineReport, PlannedStep, Stage};
