//! Types for remote processing service operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during remote processing operations.
///
/// Any of these is terminal for the job whose stage produced it; failures
/// never cross job boundaries and never block the worker's progression to
/// the next queued job.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Response to an upload operation.
///
/// Response fields are lenient: the remote service has been observed to omit
/// URLs on otherwise-successful responses, and the final-URL fallback chain
/// depends on representing that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URL of the uploaded copy.
    #[serde(default)]
    pub view_url: Option<String>,
    /// Remote folder the upload landed in.
    #[serde(default)]
    pub folder_name: Option<String>,
}

/// Response to an upscale operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpscaleResponse {
    /// Human-readable status message from the service.
    #[serde(default)]
    pub message: Option<String>,
    /// URL of the upscaled result.
    #[serde(default)]
    pub upscaled_url: Option<String>,
}

/// Response to a color-grade operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorGradeResponse {
    /// URL of the color-graded result.
    #[serde(default)]
    pub view_url: Option<String>,
}

/// The final image reference inside a metadata-fix response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalImage {
    /// URL of the metadata-fixed final image.
    #[serde(default)]
    pub view_url: Option<String>,
}

/// Response to a metadata-fix operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixMetadataResponse {
    /// The final image, if the service produced one.
    #[serde(default)]
    pub final_image: Option<FinalImage>,
}

impl FixMetadataResponse {
    /// Returns the final image URL if present.
    pub fn final_url(&self) -> Option<&str> {
        self.final_image.as_ref()?.view_url.as_deref()
    }
}
