use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::media::MediaFile;

#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysisRequest<'a> {
    pub text: &'a str,
}

/// Sentiment components as reported by the service. Values are passed
/// through without range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f64,
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "translatedText")]
    pub translated_text: Option<String>,
    pub sentiment: SentimentScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub analysis: String,
}

/// Dry-run description of a request that was validated but not sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPreview {
    pub method: &'static str,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormPreview>,
}

impl RequestPreview {
    pub fn json(url: String, body: Value) -> Self {
        Self {
            method: "POST",
            url,
            body: Some(body),
            form: None,
        }
    }

    pub fn multipart(url: String, file: FilePreview) -> Self {
        Self {
            method: "POST",
            url,
            body: None,
            form: Some(FormPreview { file }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPreview {
    pub file: FilePreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilePreview {
    pub file_name: String,
    pub content_type: String,
    pub bytes: usize,
}

impl From<&MediaFile> for FilePreview {
    fn from(file: &MediaFile) -> Self {
        Self {
            file_name: file.file_name().to_string(),
            content_type: file.content_type().to_string(),
            bytes: file.bytes().len(),
        }
    }
}

/// Pulls a human-readable reason out of an error body, if there is one.
pub(crate) fn error_detail(body: &Value) -> Option<String> {
    let error = body.get("error").and_then(Value::as_str);
    let details = body.get("details").and_then(Value::as_str);
    match (error, details) {
        (Some(error), Some(details)) => Some(format!("{error} ({details})")),
        (Some(error), None) => Some(error.to_string()),
        (None, Some(details)) => Some(details.to_string()),
        (None, None) => None,
    }
}

/// True when `field` holds something usable: not absent, null, or an empty string.
pub(crate) fn has_field(body: &Value, field: &str) -> bool {
    match body.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(value)) => !value.is_empty(),
        Some(_) => true,
    }
}
