//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::preview::PreviewHandle;

/// Which pipeline variant governs a job, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// Upload, upscale, metadata fix.
    Upscale,
    /// Upload, color grade, metadata fix.
    Color,
}

impl PipelineVariant {
    /// Returns the string representation (for logs and metric labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineVariant::Upscale => "upscale",
            PipelineVariant::Color => "color",
        }
    }
}

/// Current status of a job.
///
/// Transitions are monotonic along the pipeline:
/// ```text
/// Queued -> Uploading -> Upscaling|ColorGrading -> Uploading(metadata fix) -> Completed
/// ```
/// with a transition to `Error` possible from any non-terminal status.
/// `Completed` and `Error` are terminal; a job never re-enters `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in the instance's FIFO queue.
    Queued,
    /// An upload or metadata-fix call is in flight.
    Uploading,
    /// A color-grade call is in flight (color variant only).
    ColorGrading,
    /// An upscale call is in flight (upscale variant only).
    Upscaling,
    /// All stages finished successfully (terminal).
    Completed,
    /// A remote operation failed (terminal).
    Error,
}

impl JobStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Returns true if a remote call is in flight for this status.
    pub fn is_active_remote(&self) -> bool {
        matches!(
            self,
            JobStatus::Uploading | JobStatus::ColorGrading | JobStatus::Upscaling
        )
    }

    /// Returns the string representation (for logs and filtering).
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Uploading => "uploading",
            JobStatus::ColorGrading => "color_grading",
            JobStatus::Upscaling => "upscaling",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

/// A submitted image: descriptive metadata plus the binary payload.
///
/// The payload is behind an `Arc` so job snapshots stay cheap to clone.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Original file name as submitted.
    pub file_name: String,
    /// Media type, e.g. "image/png".
    pub media_type: String,
    /// Raw image bytes.
    pub data: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Create a new source image.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: Arc::new(data),
        }
    }

    /// Returns true if the media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Payload size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Remote-output references accumulated as stages complete.
///
/// Each slot is append-only: once set by a stage, later stages may read but
/// not clear or replace it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageArtifacts {
    /// URL of the uploaded copy of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Remote folder the upload landed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    /// URL of the enhanced (upscaled or color-graded) intermediate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_url: Option<String>,
}

impl StageArtifacts {
    /// Record the upload stage's outputs. Later writes are ignored.
    pub fn record_upload(&mut self, url: Option<String>, folder: Option<String>) {
        if self.upload_url.is_none() {
            self.upload_url = url;
        }
        if self.folder_name.is_none() {
            self.folder_name = folder;
        }
    }

    /// Record the enhance stage's output URL. Later writes are ignored.
    pub fn record_enhanced(&mut self, url: Option<String>) {
        if self.enhanced_url.is_none() {
            self.enhanced_url = url;
        }
    }
}

/// The resolved final artifact of a completed job.
///
/// `Missing` is a distinct observable condition: the job completed but no
/// stage produced a viewable URL, which the view layer must not treat as
/// silently equivalent to success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FinalArtifact {
    /// A viewable final URL.
    Url { url: String },
    /// Completed with no resolvable final URL.
    Missing,
}

impl FinalArtifact {
    /// Returns the final URL if one was resolved.
    pub fn url(&self) -> Option<&str> {
        match self {
            FinalArtifact::Url { url } => Some(url),
            FinalArtifact::Missing => None,
        }
    }

    /// Returns true if the job completed without a viewable artifact.
    pub fn is_missing(&self) -> bool {
        matches!(self, FinalArtifact::Missing)
    }
}

/// One submitted image's processing record.
///
/// Identity is assigned at submission and never reused. The record is mutated
/// only by the worker (status, progress, artifacts) and by user-initiated
/// removal or reset; mutation goes through whole-record replacement in the
/// [`JobStore`](crate::job::JobStore), never in-place field writes.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Opaque unique identifier, stable for the job's lifetime.
    pub id: String,

    /// The original payload, owned exclusively by this job until removal.
    #[serde(skip)]
    pub source: SourceImage,

    /// Local preview handle, released exactly once at removal or reset.
    pub preview: PreviewHandle,

    /// Current status.
    pub status: JobStatus,

    /// Progress 0-100, non-decreasing while the job is active.
    pub progress: u8,

    /// Original file name, copied at submission.
    pub original_file_name: String,

    /// Payload size in bytes, copied at submission.
    pub size_bytes: u64,

    /// Governing pipeline variant, fixed at creation.
    pub variant: PipelineVariant,

    /// Stage outputs accumulated so far.
    pub artifacts: StageArtifacts,

    /// Resolved final artifact, set once at the transition into `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_artifact: Option<FinalArtifact>,

    /// Error message, set at the transition into `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job was submitted.
    pub started_at: DateTime<Utc>,

    /// Wall-clock processing time, computed once at the transition into
    /// `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_secs: Option<u32>,
}

impl Job {
    /// Create a new queued job for a submitted image.
    pub fn new(source: SourceImage, preview: PreviewHandle, variant: PipelineVariant) -> Self {
        let original_file_name = source.file_name.clone();
        let size_bytes = source.size_bytes();
        Self {
            id: Uuid::new_v4().to_string(),
            source,
            preview,
            status: JobStatus::Queued,
            progress: 0,
            original_file_name,
            size_bytes,
            variant,
            artifacts: StageArtifacts::default(),
            final_artifact: None,
            error: None,
            started_at: Utc::now(),
            processing_time_secs: None,
        }
    }

    /// Returns the resolved final URL, if any.
    pub fn final_url(&self) -> Option<&str> {
        self.final_artifact.as_ref().and_then(|a| a.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewRegistry;

    fn test_job(variant: PipelineVariant) -> Job {
        let registry = PreviewRegistry::new();
        let source = SourceImage::new("photo.png", "image/png", vec![0u8; 16]);
        let preview = registry.allocate(Arc::clone(&source.data));
        Job::new(source, preview, variant)
    }

    #[test]
    fn test_status_terminality() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Uploading.is_terminal());
        assert!(!JobStatus::ColorGrading.is_terminal());
        assert!(!JobStatus::Upscaling.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn test_active_remote_statuses() {
        assert!(JobStatus::Uploading.is_active_remote());
        assert!(JobStatus::ColorGrading.is_active_remote());
        assert!(JobStatus::Upscaling.is_active_remote());
        assert!(!JobStatus::Queued.is_active_remote());
        assert!(!JobStatus::Completed.is_active_remote());
        assert!(!JobStatus::Error.is_active_remote());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&JobStatus::ColorGrading).unwrap(),
            r#""color_grading""#
        );
        let status: JobStatus = serde_json::from_str(r#""upscaling""#).unwrap();
        assert_eq!(status, JobStatus::Upscaling);
    }

    #[test]
    fn test_non_image_detection() {
        let image = SourceImage::new("a.png", "image/png", vec![]);
        assert!(image.is_image());
        let text = SourceImage::new("a.txt", "text/plain", vec![]);
        assert!(!text.is_image());
    }

    #[test]
    fn test_new_job_starts_queued() {
        let job = test_job(PipelineVariant::Upscale);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert_eq!(job.original_file_name, "photo.png");
        assert_eq!(job.size_bytes, 16);
        assert!(job.final_artifact.is_none());
        assert!(job.error.is_none());
        assert!(job.processing_time_secs.is_none());
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = test_job(PipelineVariant::Upscale);
        let b = test_job(PipelineVariant::Upscale);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_artifacts_are_append_only() {
        let mut artifacts = StageArtifacts::default();
        artifacts.record_upload(Some("http://a/1".into()), Some("batch".into()));
        artifacts.record_upload(Some("http://a/2".into()), Some("other".into()));
        assert_eq!(artifacts.upload_url.as_deref(), Some("http://a/1"));
        assert_eq!(artifacts.folder_name.as_deref(), Some("batch"));

        artifacts.record_enhanced(Some("http://a/enhanced".into()));
        artifacts.record_enhanced(None);
        artifacts.record_enhanced(Some("http://a/later".into()));
        assert_eq!(artifacts.enhanced_url.as_deref(), Some("http://a/enhanced"));
    }

    #[test]
    fn test_final_artifact_serialization() {
        let url = FinalArtifact::Url {
            url: "http://remote/final.png".into(),
        };
        let json = serde_json::to_string(&url).unwrap();
        assert!(json.contains(r#""type":"url""#));

        let missing = FinalArtifact::Missing;
        assert_eq!(
            serde_json::to_string(&missing).unwrap(),
            r#"{"type":"missing"}"#
        );
        assert!(missing.is_missing());
        assert!(missing.url().is_none());
    }

    #[test]
    fn test_job_snapshot_omits_payload() {
        let job = test_job(PipelineVariant::Color);
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains(&job.id));
        assert!(json.contains("photo.png"));
        assert!(json.contains("preview://"));
        assert!(!json.contains("\"data\""));
    }
}
