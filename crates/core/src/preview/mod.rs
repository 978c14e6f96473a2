//! Local preview handles.
//!
//! A [`PreviewHandle`] is a process-local, revocable reference to a submitted
//! image's bytes, allocated synchronously at submission so the caller can
//! render the original before any network round trip completes. Handles are
//! owned exclusively by their job and must be released exactly once, at
//! removal or full reset.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// A revocable `preview://` reference to locally held image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    /// Returns the handle as a `preview://` URI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry mapping live preview handles to their image bytes.
///
/// Allocation and release are synchronous. Release is exactly-once: a second
/// release of the same handle is counted and logged but never panics, and a
/// released handle no longer resolves.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: Mutex<HashMap<String, Arc<Vec<u8>>>>,
    released: AtomicU64,
    double_released: AtomicU64,
}

impl PreviewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for the given bytes.
    pub fn allocate(&self, data: Arc<Vec<u8>>) -> PreviewHandle {
        let handle = PreviewHandle(format!("preview://{}", Uuid::new_v4()));
        self.lock_entries().insert(handle.0.clone(), data);
        handle
    }

    /// Resolve a live handle to its bytes. Returns `None` after release.
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<Arc<Vec<u8>>> {
        self.lock_entries().get(&handle.0).cloned()
    }

    /// Release a handle. Returns `true` if the handle was live.
    pub fn release(&self, handle: &PreviewHandle) -> bool {
        let removed = self.lock_entries().remove(&handle.0).is_some();
        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
        } else {
            self.double_released.fetch_add(1, Ordering::Relaxed);
            warn!(handle = %handle, "Release of already-released preview handle");
        }
        removed
    }

    /// Number of handles released so far.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Number of release attempts on handles that were already gone.
    pub fn double_release_count(&self) -> u64 {
        self.double_released.load(Ordering::Relaxed)
    }

    /// Number of currently live handles.
    pub fn active_count(&self) -> usize {
        self.lock_entries().len()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Vec<u8>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
