use serde::Serialize;

const RASTER_MARKERS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// What the card shows on its leading edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VisualChoice {
    Svg { url: String },
    Image { url: String },
    Favicon { url: String },
    Placeholder,
}

impl VisualChoice {
    pub fn url(&self) -> Option<&str> {
        match self {
            VisualChoice::Svg { url }
            | VisualChoice::Image { url }
            | VisualChoice::Favicon { url } => Some(url),
            VisualChoice::Placeholder => None,
        }
    }
}

/// First raster image (`.png`, `.jpg`, `.jpeg`), or the first image of any
/// kind when none match.
pub fn pick_image_candidate<S: AsRef<str>>(images: &[S]) -> Option<&str> {
    images
        .iter()
        .map(|image| image.as_ref())
        .find(|url| RASTER_MARKERS.iter().any(|marker| url.contains(*marker)))
        .or_else(|| images.first().map(|image| image.as_ref()))
}

/// Picks the visual for a card. Favicons are listed smallest first, so the
/// last one is used. Once the content image has failed to load the card
/// shows the placeholder rather than the favicon.
pub fn select_visual<S: AsRef<str>>(
    images: &[S],
    favicons: &[S],
    image_load_failed: bool,
) -> VisualChoice {
    if let Some(candidate) = pick_image_candidate(images) {
        if candidate.contains(".svg") {
            return VisualChoice::Svg {
                url: candidate.to_string(),
            };
        }
        if image_load_failed {
            return VisualChoice::Placeholder;
        }
        return VisualChoice::Image {
            url: candidate.to_string(),
        };
    }

    match favicons.last() {
        Some(favicon) if !image_load_failed => VisualChoice::Favicon {
            url: favicon.as_ref().to_string(),
        },
        _ => VisualChoice::Placeholder,
    }
}
