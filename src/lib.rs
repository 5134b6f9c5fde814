use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cache")]
mod cache;
mod display;
mod error;
mod extractor;
mod fetcher;
mod image_selector;
#[cfg(feature = "logging")]
mod logging;
mod normalizer;
mod preview;
mod url_matcher;
mod utils;

#[cfg(feature = "cache")]
pub use cache::{Cache, CachedFetcher};
pub use display::build_display_string;
pub use error::PreviewError;
pub use extractor::MetadataExtractor;
pub use fetcher::{Fetcher, FetcherConfig, RequestOptions};
pub use image_selector::{pick_image_candidate, select_visual, VisualChoice};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_preview_card, setup_logging, LogConfig};
pub use normalizer::{normalize, NormalizedMetadata};
pub use preview::{
    CardOptions, DisplayState, FetchCompletion, LinkPreview, PendingFetch, Phase, PreviewCard,
};
pub use url_matcher::{find_first_url, find_urls};

/// Page metadata as produced by a [`MetadataFetcher`] or supplied by the caller.
///
/// `id`, `media_type`, `content_type` and `videos` are carried along for the
/// caller and never read by the card pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetadata {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
    pub images: Vec<String>,
    pub favicons: Vec<String>,
    pub media_type: Option<String>,
    pub content_type: Option<String>,
    pub videos: Vec<String>,
}

/// What a card is built from: text containing a URL to fetch, or metadata the
/// caller already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Url(String),
    Metadata(RawMetadata),
}

impl Source {
    /// Parses a source given as JSON: a string is a URL, an object is
    /// pre-built metadata. Anything else is a malformed object.
    pub fn from_json(json: &str) -> Result<Self, PreviewError> {
        serde_json::from_str(json).map_err(|e| PreviewError::NormalizationError(e.to_string()))
    }
}

impl From<&str> for Source {
    fn from(url: &str) -> Self {
        Source::Url(url.to_string())
    }
}

impl From<String> for Source {
    fn from(url: String) -> Self {
        Source::Url(url)
    }
}

impl From<RawMetadata> for Source {
    fn from(metadata: RawMetadata) -> Self {
        Source::Metadata(metadata)
    }
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetches metadata for the first URL found in `text`.
    async fn fetch_metadata(
        &self,
        text: &str,
        options: &RequestOptions,
    ) -> Result<RawMetadata, PreviewError>;
}
