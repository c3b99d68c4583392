use std::time::Duration;

use log::{debug, info, trace};
use reqwest::multipart;
use reqwest::{Client, Response, StatusCode};

use crate::error_handling::types::ApiError;
use crate::service_client::detection_service::DetectionService;
use crate::service_client::types::{AnalysisResult, LiveResults, UploadResponse};

const START_PATH: &str = "/start_live_detection";
const STOP_PATH: &str = "/stop_live_detection";
const RESULTS_PATH: &str = "/get_live_results";
const UPLOAD_PATH: &str = "/upload_video";

/// Async HTTP client for the detection server endpoints.
#[derive(Debug, Clone)]
pub struct HttpDetectionService {
    base_url: String,
    http: Client,
}

impl HttpDetectionService {
    /// Create a new client targeting the provided base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_response(response: Response) -> Result<(), ApiError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::UnexpectedStatus { status, body })
    }
}

/// Maps an upload answer onto the analysis result or the most specific error available.
///
/// Non-2xx bodies carrying `{"error": ...}` become [`ApiError::Service`]; anything else keeps the
/// raw status. A 2xx body with `success: false` is a service failure as well.
pub fn interpret_upload_response(status: StatusCode, body: &str) -> Result<AnalysisResult, ApiError> {
    let parsed: Option<UploadResponse> = serde_json::from_str(body).ok();

    if !status.is_success() {
        return match parsed.and_then(|p| p.error) {
            Some(message) => Err(ApiError::Service(message)),
            None => Err(ApiError::UnexpectedStatus {
                status,
                body: body.to_string(),
            }),
        };
    }

    match parsed {
        Some(UploadResponse {
            success: true,
            results: Some(results),
            ..
        }) => Ok(results),
        Some(UploadResponse { error, .. }) => Err(ApiError::Service(
            error.unwrap_or_else(|| "Analysis failed".to_string()),
        )),
        None => Err(ApiError::Service("Analysis failed".to_string())),
    }
}

impl DetectionService for HttpDetectionService {
    async fn start_live_detection(&self) -> Result<(), ApiError> {
        debug!("POST {}", START_PATH);
        let response = self.http.post(self.url(START_PATH)).send().await?;
        Self::handle_response(response).await
    }

    async fn stop_live_detection(&self) -> Result<(), ApiError> {
        debug!("POST {}", STOP_PATH);
        let response = self.http.post(self.url(STOP_PATH)).send().await?;
        Self::handle_response(response).await
    }

    async fn get_live_results(&self) -> Result<LiveResults, ApiError> {
        trace!("GET {}", RESULTS_PATH);
        let response = self.http.get(self.url(RESULTS_PATH)).send().await?;

        if response.status().is_success() {
            response.json().await.map_err(ApiError::from)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::UnexpectedStatus { status, body })
        }
    }

    async fn upload_video(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AnalysisResult, ApiError> {
        info!(
            "Uploading {} ({} bytes, {}) to {}",
            file_name,
            bytes.len(),
            media_type,
            UPLOAD_PATH
        );

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)?;
        let form = multipart::Form::new().part("video", part);

        let response = self
            .http
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Upload answered with status {}", status);
        interpret_upload_response(status, &body)
    }
}
