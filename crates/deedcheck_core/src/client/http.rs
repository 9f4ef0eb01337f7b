//! reqwest-backed analysis client.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};

use crate::config::ApiSettings;
use crate::models::{AnalysisResult, DocumentFile};

use super::errors::{ClientError, ClientResult};
use super::{AnalysisClient, UploadProgressFn};

/// Endpoint path appended to the configured base URL.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Size of each body chunk; upload progress is reported once per chunk.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Splits the document into upload chunks. The chunks share `bytes`' buffer.
fn upload_chunks(bytes: &Bytes) -> Vec<Bytes> {
    (0..bytes.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + UPLOAD_CHUNK_SIZE).min(bytes.len())))
        .collect()
}

/// Percentage of `total` bytes sent, rounded. Zero-length uploads are done.
pub fn upload_percent(sent: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (sent as f64 / total as f64 * 100.0).round().min(100.0)
}

/// Talks to the analysis service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{}{}", trimmed, ANALYZE_PATH))
            .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("deedcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Build a client from the `[api]` config section.
    pub fn from_settings(api: &ApiSettings) -> ClientResult<Self> {
        Self::new(&api.base_url, api.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Multipart form with the document streamed in chunks.
    fn build_form(
        &self,
        file: &DocumentFile,
        bytes: Bytes,
        model: &str,
        on_upload_progress: UploadProgressFn,
    ) -> ClientResult<Form> {
        let total = bytes.len() as u64;
        if total == 0 {
            on_upload_progress(100.0);
        }

        let chunks = upload_chunks(&bytes);
        let mut sent = 0u64;
        let stream = futures_util::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            on_upload_progress(upload_percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name.clone())
            .mime_str("application/pdf")?;

        Ok(Form::new().part("file", part).text("model", model.to_string()))
    }
}

impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(
        &self,
        file: &DocumentFile,
        model: &str,
        on_upload_progress: UploadProgressFn,
    ) -> ClientResult<AnalysisResult> {
        let bytes = Bytes::from(tokio::fs::read(&file.path).await?);
        tracing::debug!(
            "Uploading {} ({} bytes) to {} with model '{}'",
            file.name,
            bytes.len(),
            self.endpoint,
            model
        );

        let form = self.build_form(file, bytes, model, Arc::clone(&on_upload_progress))?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("Analysis service returned {}", status);
            return Err(ClientError::status(status.as_u16(), &body));
        }

        let result: AnalysisResult = serde_json::from_str(&body)?;
        tracing::debug!(
            "Analysis complete: risk score {:?}, {} issue(s)",
            result.risk_score(),
            result.issues().len()
        );
        Ok(result)
    }
}
