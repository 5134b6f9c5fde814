use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("No valid URL found in source: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch content: {0}")]
    FetchError(String),

    #[error("HTTP {status} returned for {url}")]
    HttpError { status: u16, url: String },

    #[error("Request timeout: {0}")]
    TimeoutError(String),

    #[error("Failed to extract metadata: {0}")]
    ExtractError(String),

    #[error("Malformed metadata object: {0}")]
    NormalizationError(String),

    #[error("Failed to load image: {0}")]
    ImageLoadError(String),
}

impl PreviewError {
    /// Whether the error came from the fetch stage rather than from the
    /// caller-supplied metadata or the rendering surface.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            PreviewError::UrlParseError(_)
                | PreviewError::InvalidUrl(_)
                | PreviewError::FetchError(_)
                | PreviewError::HttpError { .. }
                | PreviewError::TimeoutError(_)
                | PreviewError::ExtractError(_)
        )
    }

    pub fn log(&self) {
        match self {
            PreviewError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            PreviewError::InvalidUrl(e) => {
                warn!(source = %e, "No URL found in source text");
            }
            PreviewError::FetchError(e) => {
                error!(error = %e, "Metadata fetch failed");
            }
            PreviewError::HttpError { status, url } => {
                warn!(status = %status, url = %url, "Unexpected HTTP status");
            }
            PreviewError::TimeoutError(e) => {
                warn!(error = %e, "Request timed out");
            }
            PreviewError::ExtractError(e) => {
                error!(error = %e, "Metadata extraction failed");
            }
            PreviewError::NormalizationError(e) => {
                warn!(error = %e, "Pre-built metadata rejected");
            }
            PreviewError::ImageLoadError(e) => {
                debug!(url = %e, "Image failed to load, falling back");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        assert!(PreviewError::TimeoutError("slow".into()).is_fetch_error());
        assert!(PreviewError::HttpError {
            status: 404,
            url: "https://example.com".into()
        }
        .is_fetch_error());
        assert!(!PreviewError::NormalizationError("bad".into()).is_fetch_error());
        assert!(!PreviewError::ImageLoadError("a.png".into()).is_fetch_error());
    }

    #[test]
    fn test_display_messages() {
        let err = PreviewError::HttpError {
            status: 500,
            url: "https://example.com".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500 returned for https://example.com");
    }
}
