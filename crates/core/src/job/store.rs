//! In-memory job record store.
//!
//! The store is the only resource shared between the worker and the
//! caller-facing removal/reset/snapshot operations. Records are mutated
//! exclusively through whole-record replacement keyed by job id, never in
//! place, so observers never see a partially updated record. Insertion order
//! is preserved and is the order snapshots are returned in.

use thiserror::Error;
use tokio::sync::{watch, RwLock};

use super::types::{Job, JobStatus};

/// Error type for job store operations.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// No record with the given id.
    #[error("Job not found: {0}")]
    NotFound(String),
}

/// Ordered in-memory collection of job records.
///
/// A `watch` revision counter is bumped on every mutation so the view layer
/// can re-read the snapshot after each store change.
#[derive(Debug)]
pub struct JobStore {
    jobs: RwLock<Vec<Job>>,
    revision: watch::Sender<u64>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            jobs: RwLock::new(Vec::new()),
            revision,
        }
    }

    /// Append a job record, preserving submission order.
    pub async fn insert(&self, job: Job) {
        self.jobs.write().await.push(job);
        self.bump();
    }

    /// Get a job record by id.
    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    /// Read-only snapshot of all records in submission order.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    /// Replace the record with the given id wholesale, after applying `f` to
    /// a copy. Returns the updated record.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<Job, JobStoreError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let slot = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;

        let mut updated = slot.clone();
        f(&mut updated);
        *slot = updated.clone();
        drop(jobs);

        self.bump();
        Ok(updated)
    }

    /// Remove the record with the given id. Returns the removed record.
    pub async fn remove(&self, id: &str) -> Option<Job> {
        let mut jobs = self.jobs.write().await;
        let idx = jobs.iter().position(|j| j.id == id)?;
        let removed = jobs.remove(idx);
        drop(jobs);

        self.bump();
        Some(removed)
    }

    /// Remove every record. Returns the removed records.
    pub async fn clear(&self) -> Vec<Job> {
        let removed = std::mem::take(&mut *self.jobs.write().await);
        if !removed.is_empty() {
            self.bump();
        }
        removed
    }

    /// Number of records currently in the store.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Returns true if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Number of records in the `Completed` status.
    pub async fn completed_count(&self) -> usize {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .count()
    }

    /// Subscribe to the revision counter; the value changes after every
    /// store mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}
