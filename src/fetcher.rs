use crate::utils::default_favicon;
use crate::{MetadataExtractor, MetadataFetcher, PreviewError, RawMetadata};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Per-request options forwarded untouched from the card to the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Meta property prefix used for images, e.g. `twitter` for `twitter:image`.
    pub images_property_type: Option<String>,
    /// Prefix prepended to the page URL, for CORS-style proxies.
    pub proxy_url: Option<String>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_images_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.images_property_type = Some(property_type.into());
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    extractor: MetadataExtractor,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        debug!("Fetcher initialized with default configuration");

        Self::new_with_config(FetcherConfig::default()).unwrap_or_else(|e| {
            error!(error = %e, "Failed to create HTTP client");
            panic!("Failed to initialize HTTP client: {}", e);
        })
    }

    /// Creates a Fetcher with custom configuration
    pub fn new_with_config(config: FetcherConfig) -> Result<Self, PreviewError> {
        let mut client_builder = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .pool_max_idle_per_host(10);

        if let Some(headers) = config.headers {
            client_builder = client_builder.default_headers(headers);
        }

        if let Some(redirect_policy) = config.redirect_policy {
            client_builder = client_builder.redirect(redirect_policy);
        }

        let client = client_builder
            .build()
            .map_err(|e| PreviewError::FetchError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            extractor: MetadataExtractor::new(),
        }
    }

    pub async fn fetch_batch(
        &self,
        sources: Vec<&str>,
        options: &RequestOptions,
    ) -> Vec<Result<RawMetadata, PreviewError>> {
        let futures: Vec<_> = sources
            .into_iter()
            .map(|source| self.fetch(source, options))
            .collect();
        futures::future::join_all(futures).await
    }

    #[instrument(level = "debug", skip(self, options), err)]
    pub async fn fetch(
        &self,
        text: &str,
        options: &RequestOptions,
    ) -> Result<RawMetadata, PreviewError> {
        let url = detect_url(text)?;
        let target = match &options.proxy_url {
            Some(proxy) => format!("{proxy}{url}"),
            None => url.to_string(),
        };
        debug!(url = %url, target = %target, "Starting fetch request");

        let mut request = self.client.get(&target);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, url = %target, "Failed to send request");
            request_error(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Relative links resolve against the page itself, not the proxy.
        let page = if options.proxy_url.is_some() {
            url
        } else {
            response.url().clone()
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase());

        let top_level = content_type
            .as_deref()
            .map(|value| value.split('/').next().unwrap_or(value).to_string());

        match top_level.as_deref() {
            None | Some("text") => {
                let html = response.text().await.map_err(|e| {
                    error!(error = %e, url = %page, "Failed to read response body");
                    request_error(e)
                })?;
                debug!(url = %page, content_length = html.len(), "Successfully fetched webpage");

                let mut metadata = self.extractor.extract(
                    &html,
                    &page,
                    options.images_property_type.as_deref(),
                );
                if content_type.is_some() {
                    metadata.content_type = content_type;
                }
                Ok(metadata)
            }
            Some(media @ ("image" | "audio" | "video" | "application")) => {
                debug!(url = %page, media_type = media, "Fetched non-HTML resource");
                Ok(RawMetadata {
                    url: Some(page.to_string()),
                    media_type: Some(media.to_string()),
                    content_type,
                    favicons: default_favicon(&page).into_iter().collect(),
                    ..Default::default()
                })
            }
            Some(_) => Err(PreviewError::ExtractError(format!(
                "Unknown content type {} for {}",
                content_type.unwrap_or_default(),
                page
            ))),
        }
    }
}

#[async_trait]
impl MetadataFetcher for Fetcher {
    async fn fetch_metadata(
        &self,
        text: &str,
        options: &RequestOptions,
    ) -> Result<RawMetadata, PreviewError> {
        self.fetch(text, options).await
    }
}

/// First whitespace-separated token of `text` that is an http(s) URL.
fn detect_url(text: &str) -> Result<Url, PreviewError> {
    if let Some(url) = text.split_whitespace().find_map(|token| {
        Url::parse(token)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }) {
        return Ok(url);
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() && !trimmed.contains(char::is_whitespace) {
        // Surface the parser's reason for a lone malformed token.
        Url::parse(trimmed)?;
    }
    Err(PreviewError::InvalidUrl(text.to_string()))
}

fn request_error(e: reqwest::Error) -> PreviewError {
    if e.is_timeout() {
        PreviewError::TimeoutError(e.to_string())
    } else {
        PreviewError::FetchError(e.to_string())
    }
}

/// HTTP client settings for [`Fetcher`].
///
/// # Examples
/// ```ignore
/// let fetcher = Fetcher::new_with_config(FetcherConfig {
///     user_agent: "my-custom-agent/1.0".to_string(),
///     timeout: Duration::from_secs(3),
///     headers: Some(my_custom_headers),
///     redirect_policy: Some(reqwest::redirect::Policy::limited(5)),
/// })?;
/// ```
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: Option<HeaderMap>,
    pub redirect_policy: Option<reqwest::redirect::Policy>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "url_preview_card/0.1.0".to_string(),
            timeout: Duration::from_secs(10),
            headers: None,
            redirect_policy: None,
        }
    }
}

impl FetcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_url_in_text() {
        let url = detect_url("see https://example.com/a for details").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");

        let url = detect_url("mailto:a@b.c then http://example.org").unwrap();
        assert_eq!(url.as_str(), "http://example.org/");
    }

    #[test]
    fn test_detect_url_failures() {
        assert!(matches!(
            detect_url("not-a-valid-url"),
            Err(PreviewError::UrlParseError(_))
        ));
        assert!(matches!(
            detect_url("no url in this text"),
            Err(PreviewError::InvalidUrl(_))
        ));
        assert!(matches!(detect_url(""), Err(PreviewError::InvalidUrl(_))));
        assert!(matches!(
            detect_url("ftp://example.com/file"),
            Err(PreviewError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_request_options_json_shape() {
        let options: RequestOptions = serde_json::from_str(
            r#"{"headers":{"user-agent":"googlebot"},"imagesPropertyType":"og","proxyUrl":"https://proxy/"}"#,
        )
        .unwrap();
        assert_eq!(
            options,
            RequestOptions::default()
                .with_header("user-agent", "googlebot")
                .with_images_property_type("og")
                .with_proxy_url("https://proxy/")
        );
    }
}
