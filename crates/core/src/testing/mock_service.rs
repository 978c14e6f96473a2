//! Mock remote processing service for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};

use crate::job::SourceImage;
use crate::service::{
    ColorGradeResponse, FinalImage, FixMetadataResponse, RemoteProcessingService,
    RemoteServiceError, UpscaleResponse, UploadResponse,
};

/// One recorded service call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOp {
    Upload {
        file_name: String,
        folder_tag: String,
    },
    Upscale {
        source_url: String,
    },
    ColorGrade {
        source_url: String,
    },
    FixMetadata {
        before_url: String,
        after_url: String,
    },
}

impl RecordedOp {
    /// Returns the operation name, matching the engine's metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            RecordedOp::Upload { .. } => "upload",
            RecordedOp::Upscale { .. } => "upscale",
            RecordedOp::ColorGrade { .. } => "color_grade",
            RecordedOp::FixMetadata { .. } => "fix_metadata",
        }
    }
}

/// A recorded call with its arrival time.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub op: RecordedOp,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the RemoteProcessingService trait.
///
/// Provides controllable behavior for testing:
/// - Records every call for assertions
/// - Scripted per-operation responses, consumed in order
/// - Simulated failures
/// - An optional gate that holds calls open until the test releases them
///
/// # Example
///
/// ```rust,ignore
/// let service = MockRemoteService::new();
/// service.fail_next(RemoteServiceError::Timeout).await;
///
/// // First call fails, subsequent calls succeed with generated URLs
/// let err = service.upscale("http://remote/orig/1.png").await.unwrap_err();
/// assert!(matches!(err, RemoteServiceError::Timeout));
///
/// let calls = service.calls().await;
/// assert_eq!(calls[0].op.name(), "upscale");
/// ```
pub struct MockRemoteService {
    /// Recorded calls in arrival order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call (any operation) fails with this error.
    next_error: Arc<RwLock<Option<RemoteServiceError>>>,
    /// Scripted responses, consumed before falling back to generated ones.
    upload_responses: Arc<RwLock<VecDeque<Result<UploadResponse, RemoteServiceError>>>>,
    upscale_responses: Arc<RwLock<VecDeque<Result<UpscaleResponse, RemoteServiceError>>>>,
    color_grade_responses: Arc<RwLock<VecDeque<Result<ColorGradeResponse, RemoteServiceError>>>>,
    fix_metadata_responses: Arc<RwLock<VecDeque<Result<FixMetadataResponse, RemoteServiceError>>>>,
    /// When present, each call consumes one permit before returning.
    gate: Arc<RwLock<Option<Arc<Semaphore>>>>,
    /// Counter for generating unique result URLs.
    url_counter: AtomicU32,
}

impl Default for MockRemoteService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteService {
    /// Create a new mock service. All operations succeed with generated
    /// URLs until scripted otherwise.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            upload_responses: Arc::new(RwLock::new(VecDeque::new())),
            upscale_responses: Arc::new(RwLock::new(VecDeque::new())),
            color_grade_responses: Arc::new(RwLock::new(VecDeque::new())),
            fix_metadata_responses: Arc::new(RwLock::new(VecDeque::new())),
            gate: Arc::new(RwLock::new(None)),
            url_counter: AtomicU32::new(0),
        }
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the recorded operations, without timestamps.
    pub async fn ops(&self) -> Vec<RecordedOp> {
        self.calls.read().await.iter().map(|c| c.op.clone()).collect()
    }

    /// Get the recorded operation names in arrival order.
    pub async fn op_names(&self) -> Vec<&'static str> {
        self.calls.read().await.iter().map(|c| c.op.name()).collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Make the next call (any operation) fail with the given error.
    pub async fn fail_next(&self, error: RemoteServiceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Script the next upload response.
    pub async fn queue_upload(&self, response: Result<UploadResponse, RemoteServiceError>) {
        self.upload_responses.write().await.push_back(response);
    }

    /// Script the next upscale response.
    pub async fn queue_upscale(&self, response: Result<UpscaleResponse, RemoteServiceError>) {
        self.upscale_responses.write().await.push_back(response);
    }

    /// Script the next color-grade response.
    pub async fn queue_color_grade(
        &self,
        response: Result<ColorGradeResponse, RemoteServiceError>,
    ) {
        self.color_grade_responses.write().await.push_back(response);
    }

    /// Script the next metadata-fix response.
    pub async fn queue_fix_metadata(
        &self,
        response: Result<FixMetadataResponse, RemoteServiceError>,
    ) {
        self.fix_metadata_responses.write().await.push_back(response);
    }

    /// Gate all calls: each call blocks until a permit is released via
    /// [`release_calls`](Self::release_calls). The call is recorded before
    /// it blocks.
    pub async fn hold_calls(&self) {
        *self.gate.write().await = Some(Arc::new(Semaphore::new(0)));
    }

    /// Release `n` gated calls.
    pub async fn release_calls(&self, n: usize) {
        if let Some(gate) = self.gate.read().await.as_ref() {
            gate.add_permits(n);
        }
    }

    /// Stop gating; pending and future calls proceed immediately.
    pub async fn release_all(&self) {
        if let Some(gate) = self.gate.write().await.take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    async fn record(&self, op: RecordedOp) {
        self.calls.write().await.push(RecordedCall {
            op,
            timestamp: Utc::now(),
        });
    }

    async fn wait_gate(&self) {
        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire_owned().await {
                permit.forget();
            }
        }
    }

    async fn next_result<T>(
        &self,
        scripted: &RwLock<VecDeque<Result<T, RemoteServiceError>>>,
        generated: T,
    ) -> Result<T, RemoteServiceError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        match scripted.write().await.pop_front() {
            Some(response) => response,
            None => Ok(generated),
        }
    }

    fn next_url(&self, kind: &str) -> String {
        let n = self.url_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("http://remote/{}/{}.png", kind, n)
    }
}

#[async_trait]
impl RemoteProcessingService for MockRemoteService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(
        &self,
        image: &SourceImage,
        folder_tag: &str,
    ) -> Result<UploadResponse, RemoteServiceError> {
        self.record(RecordedOp::Upload {
            file_name: image.file_name.clone(),
            folder_tag: folder_tag.to_string(),
        })
        .await;
        self.wait_gate().await;

        let generated = UploadResponse {
            view_url: Some(self.next_url("orig")),
            folder_name: Some(folder_tag.to_string()),
        };
        self.next_result(&self.upload_responses, generated).await
    }

    async fn color_grade(
        &self,
        source_url: &str,
    ) -> Result<ColorGradeResponse, RemoteServiceError> {
        self.record(RecordedOp::ColorGrade {
            source_url: source_url.to_string(),
        })
        .await;
        self.wait_gate().await;

        let generated = ColorGradeResponse {
            view_url: Some(self.next_url("graded")),
        };
        self.next_result(&self.color_grade_responses, generated)
            .await
    }

    async fn upscale(&self, source_url: &str) -> Result<UpscaleResponse, RemoteServiceError> {
        self.record(RecordedOp::Upscale {
            source_url: source_url.to_string(),
        })
        .await;
        self.wait_gate().await;

        let generated = UpscaleResponse {
            message: Some("upscaled".to_string()),
            upscaled_url: Some(self.next_url("upscaled")),
        };
        self.next_result(&self.upscale_responses, generated).await
    }

    async fn fix_metadata(
        &self,
        before_url: &str,
        after_url: &str,
    ) -> Result<FixMetadataResponse, RemoteServiceError> {
        self.record(RecordedOp::FixMetadata {
            before_url: before_url.to_string(),
            after_url: after_url.to_string(),
        })
        .await;
        self.wait_gate().await;

        let generated = FixMetadataResponse {
            final_image: Some(FinalImage {
                view_url: Some(self.next_url("final")),
            }),
        };
        self.next_result(&self.fix_metadata_responses, generated)
            .await
    }
}
