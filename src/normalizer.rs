use crate::utils::{bare_domain, capitalize_first};
use crate::RawMetadata;
use serde::Serialize;
use std::ops::Deref;

/// Metadata whose `site_name` has been filled in from the URL when the
/// source did not provide one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedMetadata(RawMetadata);

impl NormalizedMetadata {
    pub fn into_inner(self) -> RawMetadata {
        self.0
    }
}

impl Deref for NormalizedMetadata {
    type Target = RawMetadata;

    fn deref(&self) -> &RawMetadata {
        &self.0
    }
}

/// Fills in a missing or empty `site_name` from the URL's first domain label,
/// e.g. `https://www.example.com/a` gives `Example`. A present site name is
/// never touched.
pub fn normalize(mut raw: RawMetadata) -> NormalizedMetadata {
    let missing = raw.site_name.as_deref().map_or(true, str::is_empty);
    if missing {
        raw.site_name = raw.url.as_deref().and_then(site_name_from_url);
    }
    NormalizedMetadata(raw)
}

fn site_name_from_url(url: &str) -> Option<String> {
    let label = bare_domain(url).split('.').next().unwrap_or_default();
    if label.is_empty() {
        return None;
    }
    Some(capitalize_first(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: Option<&str>, site_name: Option<&str>) -> RawMetadata {
        RawMetadata {
            url: url.map(String::from),
            site_name: site_name.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_present_site_name_passes_through() {
        let normalized = normalize(raw(Some("https://www.nytimes.com"), Some("The New York Times")));
        assert_eq!(normalized.site_name.as_deref(), Some("The New York Times"));
    }

    #[test]
    fn test_site_name_derived_from_url() {
        let normalized = normalize(raw(Some("https://www.Example.com/path"), None));
        assert_eq!(normalized.site_name.as_deref(), Some("Example"));

        let normalized = normalize(raw(Some("http://github.com/rust-lang?tab=repos"), None));
        assert_eq!(normalized.site_name.as_deref(), Some("Github"));

        let normalized = normalize(raw(Some("https://docs.rs#top"), Some("")));
        assert_eq!(normalized.site_name.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_no_url_leaves_site_name_absent() {
        let normalized = normalize(raw(None, None));
        assert_eq!(normalized.site_name, None);

        let normalized = normalize(raw(Some("https://"), None));
        assert_eq!(normalized.site_name, None);
    }

    #[test]
    fn test_normalize_is_a_fixed_point() {
        for input in [
            raw(Some("https://www.example.com"), None),
            raw(Some("https://rust-lang.org"), Some("Rust")),
            raw(None, None),
            raw(Some(""), Some("")),
        ] {
            let once = normalize(input);
            let twice = normalize(once.clone().into_inner());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_other_fields_untouched() {
        let input = RawMetadata {
            url: Some("https://example.com".into()),
            title: Some("Title".into()),
            images: vec!["https://example.com/a.png".into()],
            favicons: vec!["https://example.com/favicon.ico".into()],
            ..Default::default()
        };
        let normalized = normalize(input.clone());
        assert_eq!(normalized.title, input.title);
        assert_eq!(normalized.images, input.images);
        assert_eq!(normalized.favicons, input.favicons);
    }
}
