use reqwest::RequestBuilder;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::dispatch::endpoint::{DEFAULT_BASE_URL, Endpoint};
use crate::dispatch::error::{DispatchError, ValidationError};
use crate::dispatch::media::{MediaFile, MediaKind};
use crate::dispatch::payload::{
    FilePreview, ImageAnalysis, RequestPreview, TextAnalysis, TextAnalysisRequest, VideoAnalysis,
    error_detail, has_field,
};

/// Issues one request per submission against the analysis service.
///
/// The dispatcher holds no per-request state: every `submit_*` call is an
/// independent request/response pair, and calls may overlap freely.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Dispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.base_url)
    }

    /// Sends `text` verbatim for sentiment analysis.
    ///
    /// Blank input is rejected without touching the network.
    pub async fn submit_text(&self, text: &str) -> Result<TextAnalysis, DispatchError> {
        check_text(text)?;

        let endpoint = Endpoint::Sentiment;
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&TextAnalysisRequest { text });

        self.dispatch(endpoint, request).await
    }

    /// Uploads an image and returns the detected facial expression.
    pub async fn submit_image(&self, file: Option<&MediaFile>) -> Result<String, DispatchError> {
        let request = self.media_request(MediaKind::Image, file)?;
        let analysis: ImageAnalysis = self.dispatch(Endpoint::AnalyzeImage, request).await?;
        Ok(analysis.expression)
    }

    /// Uploads a video and returns the service's analysis summary.
    pub async fn submit_video(&self, file: Option<&MediaFile>) -> Result<String, DispatchError> {
        let request = self.media_request(MediaKind::Video, file)?;
        let analysis: VideoAnalysis = self.dispatch(Endpoint::AnalyzeVideo, request).await?;
        Ok(analysis.analysis)
    }

    /// Validates `text` and describes the request `submit_text` would send.
    pub fn preview_text(&self, text: &str) -> Result<RequestPreview, DispatchError> {
        check_text(text)?;
        Ok(RequestPreview::json(
            self.url(Endpoint::Sentiment),
            json!({ "text": text }),
        ))
    }

    /// Validates `file` and describes the upload `submit_image` or
    /// `submit_video` would send. The payload bytes are summarised, not copied.
    pub fn preview_media(
        &self,
        kind: MediaKind,
        file: Option<&MediaFile>,
    ) -> Result<RequestPreview, DispatchError> {
        let file = check_media(kind, file)?;
        let endpoint = Endpoint::from(kind);
        Ok(RequestPreview::multipart(
            self.url(endpoint),
            FilePreview::from(file),
        ))
    }

    fn media_request(
        &self,
        kind: MediaKind,
        file: Option<&MediaFile>,
    ) -> Result<RequestBuilder, DispatchError> {
        let file = check_media(kind, file)?;
        let endpoint = Endpoint::from(kind);

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(file.content_type())
            .map_err(|source| DispatchError::Form { endpoint, source })?;
        let form = Form::new().part("file", part);

        Ok(self
            .client
            .post(self.url(endpoint))
            .header(ACCEPT, "application/json")
            .multipart(form))
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, DispatchError> {
        info!(%endpoint, url = %self.url(endpoint), "sending {} for analysis", endpoint.subject());

        let result = exchange(endpoint, request).await.and_then(|body| {
            serde_json::from_value(body).map_err(|source| DispatchError::Decode { endpoint, source })
        });

        if let Err(err) = &result {
            error!(%endpoint, error = %err, "{} analysis failed", endpoint.subject());
        }
        result
    }
}

pub(crate) fn check_text(text: &str) -> Result<(), DispatchError> {
    if text.trim().is_empty() {
        info!("rejected empty text before dispatch");
        return Err(ValidationError::EmptyText.into());
    }
    Ok(())
}

pub(crate) fn check_media(
    kind: MediaKind,
    file: Option<&MediaFile>,
) -> Result<&MediaFile, DispatchError> {
    let Some(file) = file else {
        info!(%kind, "rejected submission without a file");
        return Err(ValidationError::MissingFile { kind }.into());
    };
    if file.kind() != kind {
        info!(%kind, file_kind = %file.kind(), "rejected file of the wrong kind");
        return Err(ValidationError::UnsupportedFileType {
            kind,
            extension: file.extension().to_ascii_lowercase(),
        }
        .into());
    }
    Ok(file)
}

async fn exchange(endpoint: Endpoint, request: RequestBuilder) -> Result<Value, DispatchError> {
    let response = request
        .send()
        .await
        .map_err(|source| DispatchError::Transport { endpoint, source })?;
    let status = response.status();
    let raw = response
        .text()
        .await
        .map_err(|source| DispatchError::Transport { endpoint, source })?;
    debug!(%endpoint, %status, body = %raw, "received analysis response");

    let parsed = serde_json::from_str::<Value>(&raw);

    if !status.is_success() {
        let detail = parsed.ok().as_ref().and_then(error_detail);
        return Err(DispatchError::Status {
            endpoint,
            status,
            detail,
        });
    }

    let body = parsed.map_err(|source| DispatchError::Decode { endpoint, source })?;
    let field = endpoint.expected_field();
    if !has_field(&body, field) {
        if let Some(detail) = error_detail(&body) {
            debug!(%endpoint, detail = %detail, "service reported an error with a success status");
        }
        return Err(DispatchError::Shape { endpoint, field });
    }

    Ok(body)
}
