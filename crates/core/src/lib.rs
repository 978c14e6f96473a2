pub mod config;
pub mod engine;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod preview;
pub mod service;
pub mod testing;

pub use config::{load_config, load_config_from_str, Config, ConfigError, RemoteServiceConfig};
pub use engine::{EngineConfig, PipelineEngine};
pub use job::{
    FinalArtifact, Job, JobStatus, JobStore, JobStoreError, PipelineVariant, SourceImage,
    StageArtifacts,
};
pub use pipeline::{PipelineDefinition, Stage, StageOp};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use service::{
    ColorGradeResponse, FixMetadataResponse, HttpProcessingService, RemoteProcessingService,
    RemoteServiceError, UploadResponse, UpscaleResponse,
};
