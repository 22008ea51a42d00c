use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::dispatch::endpoint::Endpoint;
use crate::dispatch::media::MediaKind;

/// Input rejected before any request is issued.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no text provided")]
    EmptyText,
    #[error("no {kind} file selected")]
    MissingFile { kind: MediaKind },
    #[error("failed to read file '{}': {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "unsupported {kind} file type '{extension}', expected one of: {}",
        kind.allowed_extensions().join(", ")
    )]
    UnsupportedFileType { kind: MediaKind, extension: String },
}

impl ValidationError {
    /// Message shown to the user in place of a result.
    pub fn alert(&self) -> String {
        match self {
            Self::EmptyText => "Please enter some text for analysis.".to_string(),
            Self::MissingFile {
                kind: MediaKind::Image,
            } => "Please upload an image first.".to_string(),
            Self::MissingFile {
                kind: MediaKind::Video,
            } => "Please upload a video for analysis.".to_string(),
            Self::UnreadableFile { .. } | Self::UnsupportedFileType { .. } => {
                let mut message = self.to_string();
                if let Some(first) = message.get_mut(..1) {
                    first.make_ascii_uppercase();
                }
                message.push('.');
                message
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build {endpoint} upload: {source}")]
    Form {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {}", detail.as_deref().unwrap_or("no error detail"))]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} response did not contain '{field}'")]
    Shape {
        endpoint: Endpoint,
        field: &'static str,
    },
}

/// Coarse classification exposed to callers.
///
/// Every failure past local validation collapses to `Analysis`,
/// so a caller cannot tell a non-2xx reply apart from a malformed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Analysis,
}

impl DispatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            _ => FailureKind::Analysis,
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Validation(_) => None,
            Self::Transport { endpoint, .. }
            | Self::Form { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Shape { endpoint, .. } => Some(*endpoint),
        }
    }

    /// Generic user-facing message; the detail only goes to the log.
    pub fn alert(&self) -> String {
        match self {
            Self::Validation(err) => err.alert(),
            Self::Transport { endpoint, .. }
            | Self::Form { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Shape { endpoint, .. } => format!(
                "There was an issue analyzing the {}. Please try again.",
                endpoint.subject()
            ),
        }
    }
}
