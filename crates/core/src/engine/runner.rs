//! Pipeline engine implementation.
//!
//! One engine instance owns a job store, a FIFO queue of job ids, and a
//! single-flight worker that drains the queue one job at a time. The worker
//! is spawned on demand at submission and exits when the queue is empty;
//! at most one worker task runs per instance at any moment.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::job::{
    FinalArtifact, Job, JobStatus, JobStore, JobStoreError, PipelineVariant, SourceImage,
};
use crate::metrics;
use crate::pipeline::{PipelineDefinition, Stage, StageOp};
use crate::preview::PreviewRegistry;
use crate::service::{
    FixMetadataResponse, RemoteProcessingService, RemoteServiceError, UploadResponse,
};

use super::config::EngineConfig;

/// Output of one successfully invoked stage, applied to the job record
/// under the store lock.
enum StageOutput {
    Uploaded(UploadResponse),
    Enhanced(Option<String>),
    Fixed(FixMetadataResponse),
}

/// A pipeline engine instance: store, queue, worker, and definition for one
/// variant.
///
/// Cloning is cheap and yields a handle to the same instance; the worker
/// task holds one across awaits. Instances are otherwise independent: two
/// engines share nothing, so an upscale engine and a color engine can
/// process concurrently without contention.
#[derive(Clone)]
pub struct PipelineEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    definition: PipelineDefinition,
    config: EngineConfig,
    service: Arc<dyn RemoteProcessingService>,
    store: JobStore,
    previews: PreviewRegistry,

    // Runtime state
    queue: Mutex<VecDeque<String>>,
    busy: AtomicBool,
}

impl PipelineEngine {
    /// Create a new engine for the given variant.
    pub fn new(
        variant: PipelineVariant,
        config: EngineConfig,
        service: Arc<dyn RemoteProcessingService>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                definition: PipelineDefinition::for_variant(variant),
                config,
                service,
                store: JobStore::new(),
                previews: PreviewRegistry::new(),
                queue: Mutex::new(VecDeque::new()),
                busy: AtomicBool::new(false),
            }),
        }
    }

    /// The variant this engine processes.
    pub fn variant(&self) -> PipelineVariant {
        self.inner.definition.variant()
    }

    /// The preview registry backing this engine's jobs.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.inner.previews
    }

    /// Submit a batch of files. Non-image files are dropped; each accepted
    /// file becomes a queued job with an allocated preview handle.
    ///
    /// Returns the ids of accepted jobs in submission order, which is also
    /// their processing order.
    pub async fn submit(&self, files: Vec<SourceImage>) -> Vec<String> {
        let mut ids = Vec::new();

        for file in files {
            if !file.is_image() {
                debug!(
                    "Dropping non-image submission {} ({})",
                    file.file_name, file.media_type
                );
                metrics::FILES_REJECTED.inc();
                continue;
            }

            let preview = self.inner.previews.allocate(Arc::clone(&file.data));
            let job = Job::new(file, preview, self.variant());
            let id = job.id.clone();

            self.inner.store.insert(job).await;
            self.inner.queue.lock().await.push_back(id.clone());
            metrics::JOBS_SUBMITTED
                .with_label_values(&[self.variant().as_str()])
                .inc();
            ids.push(id);
        }

        if !ids.is_empty() {
            info!(
                "Accepted {} job(s) for {} pipeline",
                ids.len(),
                self.variant().as_str()
            );
            self.kick();
        }

        ids
    }

    /// Remove a job: evict it from the queue if still pending, drop its
    /// record, and release its preview handle.
    ///
    /// Removing a job whose stage call is already in flight does not abort
    /// the call; the worker notices the missing record at its next store
    /// write and moves on.
    pub async fn remove(&self, id: &str) -> Option<Job> {
        self.inner.queue.lock().await.retain(|queued| queued != id);

        let job = self.inner.store.remove(id).await?;
        if self.inner.previews.release(&job.preview) {
            metrics::PREVIEWS_RELEASED.inc();
        }
        info!("Removed job {}", id);
        Some(job)
    }

    /// Remove all jobs and release every preview handle.
    ///
    /// Returns the number of jobs cleared.
    pub async fn reset(&self) -> usize {
        self.inner.queue.lock().await.clear();

        let jobs = self.inner.store.clear().await;
        for job in &jobs {
            if self.inner.previews.release(&job.preview) {
                metrics::PREVIEWS_RELEASED.inc();
            }
        }
        info!(
            "Reset {} pipeline: cleared {} job(s)",
            self.variant().as_str(),
            jobs.len()
        );
        jobs.len()
    }

    /// Snapshot of all job records in submission order.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.inner.store.snapshot().await
    }

    /// Snapshot of a single job record.
    pub async fn get(&self, id: &str) -> Option<Job> {
        self.inner.store.get(id).await
    }

    /// Number of jobs in `Completed` status.
    pub async fn completed_count(&self) -> usize {
        self.inner.store.completed_count().await
    }

    /// Subscribe to store revisions. The receiver is notified on every job
    /// record change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.store.subscribe()
    }

    /// Returns true if no worker task is currently draining the queue.
    pub fn is_idle(&self) -> bool {
        !self.inner.busy.load(Ordering::SeqCst)
    }

    /// Spawn the worker task unless one is already running.
    fn kick(&self) {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.drain().await;
            });
        }
    }
}

impl EngineInner {
    fn variant(&self) -> PipelineVariant {
        self.definition.variant()
    }

    /// Worker loop: pop and process jobs until the queue is empty.
    async fn drain(self: Arc<Self>) {
        loop {
            let next = self.queue.lock().await.pop_front();
            match next {
                Some(id) => self.process_job(&id).await,
                None => {
                    self.busy.store(false, Ordering::SeqCst);
                    // A submitter may have enqueued between the empty pop and
                    // the flag flip. Re-acquire and keep draining if so.
                    if self.queue.lock().await.is_empty() {
                        break;
                    }
                    if self
                        .busy
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    }

    /// Run one job through every stage of the pipeline definition.
    ///
    /// A stage failure marks the job `Error` and returns; it never
    /// propagates to the queue. A missing record (removed or reset
    /// mid-flight) aborts silently.
    async fn process_job(&self, id: &str) {
        let Some(job) = self.store.get(id).await else {
            debug!("Job {} removed before processing, skipping", id);
            return;
        };

        info!(
            "Processing job {} ({}) on {} pipeline",
            id,
            job.original_file_name,
            self.variant().as_str()
        );

        for stage in self.definition.stages() {
            let started = self
                .store
                .update(id, |job| {
                    job.status = stage.status;
                    job.progress = job.progress.max(stage.progress_on_start);
                })
                .await;

            let current = match started {
                Ok(job) => job,
                Err(JobStoreError::NotFound(_)) => {
                    debug!("Job {} removed mid-flight, abandoning", id);
                    return;
                }
            };

            match self.invoke(stage.op, &current).await {
                Ok(output) => {
                    if self.apply_stage_success(id, stage, output).await.is_err() {
                        debug!("Job {} removed mid-flight, abandoning", id);
                        return;
                    }
                }
                Err(e) => {
                    self.mark_failed(id, stage.op, e).await;
                    return;
                }
            }
        }
    }

    /// Invoke the remote operation for a stage, bounded by the configured
    /// stage timeout when one is set.
    async fn invoke(&self, op: StageOp, job: &Job) -> Result<StageOutput, RemoteServiceError> {
        let call = async {
            match op {
                StageOp::Upload => self
                    .service
                    .upload(&job.source, &self.config.folder_tag)
                    .await
                    .map(StageOutput::Uploaded),
                StageOp::Upscale => {
                    let source = job.artifacts.upload_url.clone().unwrap_or_default();
                    self.service
                        .upscale(&source)
                        .await
                        .map(|r| StageOutput::Enhanced(r.upscaled_url))
                }
                StageOp::ColorGrade => {
                    let source = job.artifacts.upload_url.clone().unwrap_or_default();
                    self.service
                        .color_grade(&source)
                        .await
                        .map(|r| StageOutput::Enhanced(r.view_url))
                }
                StageOp::FixMetadata => {
                    let before = job.artifacts.upload_url.clone().unwrap_or_default();
                    let after = job
                        .artifacts
                        .enhanced_url
                        .clone()
                        .or_else(|| job.artifacts.upload_url.clone())
                        .unwrap_or_default();
                    self.service
                        .fix_metadata(&before, &after)
                        .await
                        .map(StageOutput::Fixed)
                }
            }
        };

        let started = std::time::Instant::now();
        let result = match self.config.stage_timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), call).await {
                Ok(result) => result,
                Err(_) => Err(RemoteServiceError::Timeout),
            },
            None => call.await,
        };
        metrics::REMOTE_REQUEST_DURATION
            .with_label_values(&[op.as_str()])
            .observe(started.elapsed().as_secs_f64());

        let label = match &result {
            Ok(_) => "success",
            Err(RemoteServiceError::Timeout) => "timeout",
            Err(_) => "failed",
        };
        metrics::REMOTE_REQUESTS
            .with_label_values(&[op.as_str(), label])
            .inc();

        result
    }

    /// Record a stage's outputs and milestone. The metadata-fix stage also
    /// resolves the final artifact and completes the job.
    async fn apply_stage_success(
        &self,
        id: &str,
        stage: &Stage,
        output: StageOutput,
    ) -> Result<(), JobStoreError> {
        let updated = self
            .store
            .update(id, |job| {
                match output {
                    StageOutput::Uploaded(resp) => {
                        job.artifacts.record_upload(resp.view_url, resp.folder_name);
                    }
                    StageOutput::Enhanced(url) => {
                        job.artifacts.record_enhanced(url);
                    }
                    StageOutput::Fixed(resp) => {
                        // Fallback chain: metadata-fixed URL, then the
                        // enhanced intermediate, then the bare upload.
                        let final_url = resp
                            .final_url()
                            .map(str::to_owned)
                            .or_else(|| job.artifacts.enhanced_url.clone())
                            .or_else(|| job.artifacts.upload_url.clone());
                        job.final_artifact = Some(match final_url {
                            Some(url) => FinalArtifact::Url { url },
                            None => FinalArtifact::Missing,
                        });
                        job.status = JobStatus::Completed;
                        let elapsed = (Utc::now() - job.started_at).num_seconds();
                        job.processing_time_secs = Some(elapsed.clamp(0, u32::MAX as i64) as u32);
                    }
                }
                job.progress = job.progress.max(stage.progress_on_success);
            })
            .await?;

        if updated.status == JobStatus::Completed {
            let variant = updated.variant.as_str();
            metrics::JOBS_COMPLETED.with_label_values(&[variant]).inc();
            if let Some(secs) = updated.processing_time_secs {
                metrics::JOB_DURATION
                    .with_label_values(&[variant])
                    .observe(secs as f64);
            }

            match updated.final_url() {
                Some(url) => info!("Job {} completed: {}", id, url),
                None => {
                    warn!("Job {} completed without a viewable final URL", id);
                    metrics::FINAL_URL_MISSING.inc();
                }
            }
        }

        Ok(())
    }

    /// Mark a job terminally failed. The queue keeps moving.
    async fn mark_failed(&self, id: &str, op: StageOp, error: RemoteServiceError) {
        warn!("Job {} failed at {}: {}", id, op.as_str(), error);
        metrics::JOBS_FAILED
            .with_label_values(&[self.variant().as_str(), op.as_str()])
            .inc();

        let result = self
            .store
            .update(id, |job| {
                job.status = JobStatus::Error;
                job.error = Some(error.to_string());
            })
            .await;

        if result.is_err() {
            debug!("Job {} removed before failure could be recorded", id);
        }
    }
}
