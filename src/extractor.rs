use crate::utils::{default_favicon, resolve_url};
use crate::RawMetadata;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const FAVICON_SELECTOR: &str =
    "link[rel='icon'], link[rel='shortcut icon'], link[rel='apple-touch-icon'], link[rel='apple-touch-icon-precomposed']";

const VIDEO_SELECTOR: &str =
    "meta[property='og:video:secure_url'], meta[property='og:video:url'], meta[property='og:video']";

/// Metadata extractor, responsible for extracting preview information from webpage content
#[derive(Clone)]
pub struct MetadataExtractor;

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Reads Open Graph and plain HTML metadata out of `html`.
    ///
    /// `images_property_type` selects the `{type}:image` meta property used
    /// for images (`og` when unset). Only when it is unset does the extractor
    /// fall back to `link[rel=image_src]` and then to `<img>` tags.
    pub fn extract(
        &self,
        html: &str,
        page: &Url,
        images_property_type: Option<&str>,
    ) -> RawMetadata {
        let document = Html::parse_document(html);

        let title = self.extract_title(&document);
        let description = self.extract_description(&document);
        let site_name = self.extract_meta_property(&document, "og:site_name");
        let media_type = self
            .extract_meta_property(&document, "og:type")
            .or_else(|| Some("website".to_string()));
        let images = self.extract_images(&document, page, images_property_type);
        let videos = self.extract_videos(&document, page);
        let favicons = self.extract_favicons(&document, page);

        debug!(
            url = %page,
            images = images.len(),
            favicons = favicons.len(),
            "Extracted page metadata"
        );

        RawMetadata {
            url: Some(page.to_string()),
            title,
            description,
            site_name,
            images,
            favicons,
            media_type,
            content_type: Some("text/html".to_string()),
            videos,
            ..Default::default()
        }
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;

        // If there is no Open Graph title, try to get the regular title
        self.extract_meta_property(document, "og:title")
            .or_else(|| {
                document
                    .select(&title_selector)
                    .next()
                    .map(|el| el.text().collect::<String>())
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_description(&self, document: &Html) -> Option<String> {
        let meta_desc_selector = Selector::parse("meta[name='description']").ok()?;

        self.extract_meta_property(document, "og:description")
            .or_else(|| {
                document
                    .select(&meta_desc_selector)
                    .next()
                    .and_then(|el| el.value().attr("content"))
                    .map(|s| s.trim().to_string())
            })
            .filter(|s| !s.is_empty())
    }

    fn extract_meta_property(&self, document: &Html, property: &str) -> Option<String> {
        let selector = Selector::parse(&format!("meta[property='{property}']")).ok()?;

        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_images(
        &self,
        document: &Html,
        page: &Url,
        images_property_type: Option<&str>,
    ) -> Vec<String> {
        let property = format!("{}:image", images_property_type.unwrap_or("og"));
        let mut images = self.collect_attr(
            document,
            page,
            &format!("meta[property='{property}']"),
            "content",
        );

        if images.is_empty() && images_property_type.is_none() {
            images = self.collect_attr(document, page, "link[rel='image_src']", "href");
            if images.is_empty() {
                images = self.collect_attr(document, page, "img[src]", "src");
            }
        }

        images
    }

    fn extract_videos(&self, document: &Html, page: &Url) -> Vec<String> {
        self.collect_attr(document, page, VIDEO_SELECTOR, "content")
    }

    fn extract_favicons(&self, document: &Html, page: &Url) -> Vec<String> {
        let favicons = self.collect_attr(document, page, FAVICON_SELECTOR, "href");
        if favicons.is_empty() {
            return default_favicon(page).into_iter().collect();
        }
        favicons
    }

    /// Every distinct, resolvable value of `attr` on elements matching `selector`, in document order.
    fn collect_attr(&self, document: &Html, page: &Url, selector: &str, attr: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };

        let mut found: Vec<String> = Vec::new();
        for value in document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .filter_map(|value| resolve_url(page, value))
        {
            if !found.contains(&value) {
                found.push(value);
            }
        }
        found
    }
}
