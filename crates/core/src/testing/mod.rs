//! Testing utilities and mock implementations for integration tests.
//!
//! This module provides a controllable mock of the remote processing
//! service, allowing full pipeline testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use androscaler_core::testing::{fixtures, MockRemoteService};
//!
//! let service = Arc::new(MockRemoteService::new());
//! let engine = PipelineEngine::new(
//!     PipelineVariant::Upscale,
//!     EngineConfig::default(),
//!     Arc::clone(&service) as Arc<dyn RemoteProcessingService>,
//! );
//! let ids = engine.submit(vec![fixtures::png_image("photo.png")]).await;
//! ```

mod mock_service;

pub use mock_service::{MockRemoteService, RecordedCall, RecordedOp};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::job::SourceImage;

    /// Create a small PNG source image with reasonable defaults.
    pub fn png_image(name: &str) -> SourceImage {
        SourceImage::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47, 0, 1, 2, 3])
    }

    /// Create a JPEG source image with a payload of the given size.
    pub fn jpeg_image(name: &str, size: usize) -> SourceImage {
        SourceImage::new(name, "image/jpeg", vec![0xff; size])
    }

    /// Create a non-image file, which submission must drop.
    pub fn text_file(name: &str) -> SourceImage {
        SourceImage::new(name, "text/plain", b"not an image".to_vec())
    }
}
