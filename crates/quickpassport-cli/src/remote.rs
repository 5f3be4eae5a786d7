//! HTTP client for the background removal service.
//!
//! The service receives the photo as a PNG body with the instruction in the
//! `prompt` query parameter, and answers with the edited image (JPEG or PNG).

use std::time::Duration;

use anyhow::Context;
use quickpassport_core::background::{BackgroundRemover, ProcessingError, WHITE_BACKGROUND_PROMPT};
use quickpassport_core::decode::{decode_image, DecodedImage};
use quickpassport_core::encode::encode_png;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

#[derive(Debug, Clone)]
pub struct HttpBackgroundRemover {
    client: Client,
    endpoint: String,
}

impl HttpBackgroundRemover {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn service_error(e: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::Service(e.to_string())
}

impl BackgroundRemover for HttpBackgroundRemover {
    async fn remove_background(&self, image: &DecodedImage) -> Result<DecodedImage, ProcessingError> {
        let body = encode_png(image).map_err(service_error)?;
        tracing::debug!(endpoint = %self.endpoint, bytes = body.len(), "sending photo for background removal");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("prompt", WHITE_BACKGROUND_PROMPT)])
            .header(CONTENT_TYPE, "image/png")
            .body(body)
            .send()
            .await
            .map_err(service_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::Service(format!("service answered {status}")));
        }

        let bytes = response.bytes().await.map_err(service_error)?;
        if bytes.is_empty() {
            return Err(ProcessingError::NoImageReturned);
        }
        decode_image(&bytes).map_err(service_error)
    }
}
