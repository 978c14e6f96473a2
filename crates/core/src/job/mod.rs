//! Job records and their in-memory store.

mod store;
mod types;

pub use store::{JobStore, JobStoreError};
pub use types::{FinalArtifact, Job, JobStatus, PipelineVariant, SourceImage, StageArtifacts};
