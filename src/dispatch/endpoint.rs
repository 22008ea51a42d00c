use std::fmt;

use crate::dispatch::media::MediaKind;

/// Origin of the local analysis service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// One of the three fixed analysis endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sentiment,
    AnalyzeImage,
    AnalyzeVideo,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Sentiment => "/api/sentiment",
            Self::AnalyzeImage => "/api/analyze-image",
            Self::AnalyzeVideo => "/api/analyze-video",
        }
    }

    /// Response field whose presence marks a successful analysis.
    pub fn expected_field(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::AnalyzeImage => "expression",
            Self::AnalyzeVideo => "analysis",
        }
    }

    /// Short noun for the analysed input, used in alerts and logs.
    pub fn subject(self) -> &'static str {
        match self {
            Self::Sentiment => "text",
            Self::AnalyzeImage => "image",
            Self::AnalyzeVideo => "video",
        }
    }

    pub fn url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl From<MediaKind> for Endpoint {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::AnalyzeImage,
            MediaKind::Video => Self::AnalyzeVideo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BASE_URL, Endpoint};

    #[test]
    fn url_joins_base_and_path_without_double_slash() {
        assert_eq!(
            Endpoint::Sentiment.url(DEFAULT_BASE_URL),
            "http://127.0.0.1:8000/api/sentiment"
        );
        assert_eq!(
            Endpoint::AnalyzeVideo.url("http://example.test/"),
            "http://example.test/api/analyze-video"
        );
    }

    #[test]
    fn expected_fields_match_response_contract() {
        assert_eq!(Endpoint::Sentiment.expected_field(), "sentiment");
        assert_eq!(Endpoint::AnalyzeImage.expected_field(), "expression");
        assert_eq!(Endpoint::AnalyzeVideo.expected_field(), "analysis");
    }
}
