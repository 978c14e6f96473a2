//! HTTP remote processing service implementation.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::RemoteServiceConfig;
use crate::job::SourceImage;

use super::types::{
    ColorGradeResponse, FixMetadataResponse, RemoteServiceError, UpscaleResponse, UploadResponse,
};
use super::RemoteProcessingService;

/// Remote processing service backed by the image service's HTTP API.
///
/// By default no request timeout is applied, matching the service's own
/// client behavior; long-running enhancement calls may block indefinitely
/// unless `request_timeout_secs` is configured.
pub struct HttpProcessingService {
    client: Client,
    config: RemoteServiceConfig,
}

impl HttpProcessingService {
    /// Create a new service client with the given configuration.
    pub fn new(config: RemoteServiceConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_request_error(e: reqwest::Error) -> RemoteServiceError {
        if e.is_timeout() {
            RemoteServiceError::Timeout
        } else if e.is_connect() {
            RemoteServiceError::ConnectionFailed(e.to_string())
        } else {
            RemoteServiceError::ApiError(e.to_string())
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteServiceError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteServiceError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteServiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteProcessingService for HttpProcessingService {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(
        &self,
        image: &SourceImage,
        folder_tag: &str,
    ) -> Result<UploadResponse, RemoteServiceError> {
        debug!(file = %image.file_name, folder = folder_tag, "Uploading image");

        let part = multipart::Part::bytes(image.data.as_ref().clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.media_type)
            .map_err(|e| RemoteServiceError::ApiError(format!("Invalid media type: {}", e)))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder_name", folder_tag.to_string());

        let response = self
            .client
            .post(self.endpoint("image_upload"))
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        Self::read_json(response).await
    }

    async fn color_grade(
        &self,
        source_url: &str,
    ) -> Result<ColorGradeResponse, RemoteServiceError> {
        debug!(source = source_url, "Color-grading image");

        let response = self
            .client
            .post(self.endpoint("color_grade"))
            .json(&json!({ "image_url": source_url }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        Self::read_json(response).await
    }

    async fn upscale(&self, source_url: &str) -> Result<UpscaleResponse, RemoteServiceError> {
        debug!(source = source_url, "Upscaling image");

        let form = multipart::Form::new().text("image_url", source_url.to_string());
        let response = self
            .client
            .post(self.endpoint("upscale"))
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        Self::read_json(response).await
    }

    async fn fix_metadata(
        &self,
        before_url: &str,
        after_url: &str,
    ) -> Result<FixMetadataResponse, RemoteServiceError> {
        debug!(before = before_url, after = after_url, "Fixing metadata");

        let response = self
            .client
            .post(self.endpoint("fix_metadata"))
            .json(&json!({ "before_url": before_url, "after_url": after_url }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        Self::read_json(response).await
    }
}
