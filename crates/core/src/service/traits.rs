//! Remote processing service contract.

use async_trait::async_trait;

use crate::job::SourceImage;

use super::types::{
    ColorGradeResponse, FixMetadataResponse, RemoteServiceError, UpscaleResponse, UploadResponse,
};

/// The four remote operations the engine sequences.
///
/// Each operation is a single request/response exchange with no implicit
/// retry. No timeout is applied at this layer; callers may bound calls
/// themselves (the engine does so only when configured to).
#[async_trait]
pub trait RemoteProcessingService: Send + Sync {
    /// Returns the implementation name (for logs).
    fn name(&self) -> &str;

    /// Upload a source image under the given folder tag.
    async fn upload(
        &self,
        image: &SourceImage,
        folder_tag: &str,
    ) -> Result<UploadResponse, RemoteServiceError>;

    /// Color-grade a previously uploaded image.
    async fn color_grade(&self, source_url: &str) -> Result<ColorGradeResponse, RemoteServiceError>;

    /// Upscale a previously uploaded image.
    async fn upscale(&self, source_url: &str) -> Result<UpscaleResponse, RemoteServiceError>;

    /// Fix metadata on an enhanced image, given the pre- and post-enhancement
    /// URLs.
    async fn fix_metadata(
        &self,
        before_url: &str,
        after_url: &str,
    ) -> Result<FixMetadataResponse, RemoteServiceError>;
}
