//! Remote processing service abstraction.
//!
//! The engine depends only on the [`RemoteProcessingService`] contract: four
//! single-exchange operations (upload, color grade, upscale, metadata fix)
//! with no implicit retry. [`HttpProcessingService`] is the production
//! implementation; a controllable mock lives in
//! [`testing`](crate::testing).

mod http;
mod traits;
mod types;

pub use http::HttpProcessingService;
pub use traits::RemoteProcessingService;
pub use types::{
    ColorGradeResponse, FinalImage, FixMetadataResponse, RemoteServiceError, UpscaleResponse,
    UploadResponse,
};
