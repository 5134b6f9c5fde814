use crate::{
    build_display_string, find_first_url, normalize, pick_image_candidate, select_visual,
    Fetcher, MetadataFetcher, NormalizedMetadata, PreviewError, RawMetadata, RequestOptions,
    Source, VisualChoice,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

type LoadCallback = Box<dyn Fn(&NormalizedMetadata) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&PreviewError) + Send + Sync>;

/// Where a card is in turning its source into something renderable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No source.
    #[default]
    Idle,
    /// Waiting on the fetcher.
    Resolving,
    Resolved,
    /// The fetch or the supplied object was rejected; nothing renders.
    Failed,
}

/// Text and image state for one resolution. Rebuilt from scratch every time a
/// new source is supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub is_resolved: bool,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub primary_image_url: Option<String>,
    pub favicon_url: Option<String>,
    pub image_load_failed: bool,
}

impl DisplayState {
    fn from_metadata(metadata: &NormalizedMetadata) -> Self {
        let site_name = metadata.site_name.as_deref();
        let subtitle = match metadata.url.as_deref() {
            Some(url) => Some(build_display_string(url, site_name)),
            None => site_name.map(String::from),
        };

        Self {
            is_resolved: true,
            title: non_empty(metadata.title.as_deref()),
            subtitle,
            description: non_empty(metadata.description.as_deref()),
            primary_image_url: pick_image_candidate(&metadata.images).map(String::from),
            favicon_url: metadata.favicons.last().cloned(),
            image_load_failed: false,
        }
    }

    /// The primary image is already the chosen candidate and the favicon the
    /// last one listed, so selecting over them gives the same answer as over
    /// the full lists.
    pub fn visual(&self) -> VisualChoice {
        select_visual(
            self.primary_image_url.as_slice(),
            self.favicon_url.as_slice(),
            self.image_load_failed,
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}

/// Which text blocks the card shows and how many lines each may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardOptions {
    pub show_title: bool,
    pub show_description: bool,
    pub title_number_of_lines: u32,
    pub description_number_of_lines: u32,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            show_title: true,
            show_description: true,
            title_number_of_lines: 2,
            description_number_of_lines: 3,
        }
    }
}

/// Everything the presentation shell needs to draw a resolved card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCard {
    pub visual: VisualChoice,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub title_number_of_lines: u32,
    pub description_number_of_lines: u32,
    /// URL to open on tap. `None` means the tap does nothing.
    pub tap_target: Option<String>,
}

/// A fetch started by [`LinkPreview::set_source`], to be run off the card and
/// handed back through [`LinkPreview::complete`].
pub struct PendingFetch {
    generation: u64,
    text: String,
    options: RequestOptions,
    fetcher: Arc<dyn MetadataFetcher>,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// Runs the fetch on the current tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<FetchCompletion> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) -> FetchCompletion {
        let result = self.fetcher.fetch_metadata(&self.text, &self.options).await;
        FetchCompletion {
            generation: self.generation,
            result,
        }
    }
}

pub struct FetchCompletion {
    generation: u64,
    result: Result<RawMetadata, PreviewError>,
}

impl FetchCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// State machine behind one link preview card.
///
/// Supplying a source that differs from the current one starts a new
/// resolution and bumps the generation counter; a fetch result tagged with an
/// older generation is dropped when it arrives, so out-of-order completions
/// never overwrite a newer source.
pub struct LinkPreview {
    fetcher: Arc<dyn MetadataFetcher>,
    request_options: RequestOptions,
    card_options: CardOptions,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
    source: Option<Source>,
    generation: u64,
    phase: Phase,
    display: DisplayState,
    metadata: Option<NormalizedMetadata>,
    last_error: Option<PreviewError>,
}

impl Default for LinkPreview {
    fn default() -> Self {
        Self::new(Fetcher::new())
    }
}

impl LinkPreview {
    pub fn new(fetcher: impl MetadataFetcher + 'static) -> Self {
        Self::with_shared_fetcher(Arc::new(fetcher))
    }

    /// Lets several cards share one fetcher (and its connection pool or cache).
    pub fn with_shared_fetcher(fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            fetcher,
            request_options: RequestOptions::default(),
            card_options: CardOptions::default(),
            on_load: None,
            on_error: None,
            source: None,
            generation: 0,
            phase: Phase::Idle,
            display: DisplayState::default(),
            metadata: None,
            last_error: None,
        }
    }

    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.request_options = options;
        self
    }

    pub fn with_card_options(mut self, options: CardOptions) -> Self {
        self.card_options = options;
        self
    }

    /// Called once per successful resolution, before the display state is derived.
    pub fn on_load(mut self, callback: impl Fn(&NormalizedMetadata) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Box::new(callback));
        self
    }

    /// Called once per failed resolution. Image load failures never get here.
    pub fn on_error(mut self, callback: impl Fn(&PreviewError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_resolved(&self) -> bool {
        self.display.is_resolved
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn metadata(&self) -> Option<&NormalizedMetadata> {
        self.metadata.as_ref()
    }

    pub fn last_error(&self) -> Option<&PreviewError> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the source.
    ///
    /// Metadata sources and `None` settle synchronously. A URL source leaves
    /// the card in [`Phase::Resolving`] and returns the fetch to run. Passing
    /// the current source again does nothing.
    pub fn set_source(&mut self, source: Option<Source>) -> Option<PendingFetch> {
        if source == self.source {
            return None;
        }

        self.generation += 1;
        self.source = source.clone();
        self.display = DisplayState::default();
        self.metadata = None;
        self.last_error = None;

        match source {
            None => {
                debug!(generation = self.generation, "Source cleared");
                self.phase = Phase::Idle;
                None
            }
            Some(Source::Metadata(raw)) => {
                debug!(generation = self.generation, "Resolving pre-built metadata");
                self.phase = Phase::Resolving;
                self.apply_metadata(normalize(raw));
                None
            }
            Some(Source::Url(text)) => {
                debug!(generation = self.generation, source = %text, "Dispatching metadata fetch");
                self.phase = Phase::Resolving;
                Some(PendingFetch {
                    generation: self.generation,
                    text,
                    options: self.request_options.clone(),
                    fetcher: Arc::clone(&self.fetcher),
                })
            }
        }
    }

    /// Applies a finished fetch. Returns `false` when the result belongs to a
    /// source that has since been replaced and was dropped.
    pub fn complete(&mut self, completion: FetchCompletion) -> bool {
        if completion.generation != self.generation || self.phase != Phase::Resolving {
            debug!(
                stale = completion.generation,
                current = self.generation,
                "Discarding superseded fetch result"
            );
            return false;
        }

        match completion.result {
            Ok(raw) => self.apply_metadata(normalize(raw)),
            Err(e) => self.apply_error(e),
        }
        true
    }

    /// Sets the source and drives any fetch to completion.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&mut self, source: Option<Source>) -> Phase {
        if let Some(pending) = self.set_source(source) {
            let completion = pending.run().await;
            self.complete(completion);
        }
        self.phase
    }

    /// Signal from the rendering surface that the chosen image did not load.
    /// Returns the visual to show instead.
    pub fn report_image_load_failure(&mut self) -> VisualChoice {
        let current = self.display.visual();
        if self.phase != Phase::Resolved || self.display.image_load_failed {
            return current;
        }
        let failed = match current.url() {
            Some(url) => url.to_string(),
            None => return current,
        };

        PreviewError::ImageLoadError(failed).log();
        self.display.image_load_failed = true;
        self.display.visual()
    }

    pub fn visual(&self) -> VisualChoice {
        self.display.visual()
    }

    /// Destination for a tap: the metadata's own URL, or the first URL-shaped
    /// text in a string source.
    pub fn tap_target(&self) -> Option<String> {
        match self.source.as_ref()? {
            Source::Metadata(raw) => raw.url.clone().filter(|url| !url.is_empty()),
            Source::Url(text) => find_first_url(text).map(String::from),
        }
    }

    pub fn card(&self) -> Option<PreviewCard> {
        if !self.display.is_resolved {
            return None;
        }

        let options = &self.card_options;
        Some(PreviewCard {
            visual: self.display.visual(),
            title: self.display.title.clone().filter(|_| options.show_title),
            subtitle: self.display.subtitle.clone(),
            description: self
                .display
                .description
                .clone()
                .filter(|_| options.show_description),
            title_number_of_lines: options.title_number_of_lines,
            description_number_of_lines: options.description_number_of_lines,
            tap_target: self.tap_target(),
        })
    }

    fn apply_metadata(&mut self, metadata: NormalizedMetadata) {
        if let Some(on_load) = &self.on_load {
            on_load(&metadata);
        }
        self.display = DisplayState::from_metadata(&metadata);
        self.metadata = Some(metadata);
        self.phase = Phase::Resolved;
        debug!(generation = self.generation, "Source resolved");
    }

    fn apply_error(&mut self, error: PreviewError) {
        error.log();
        if let Some(on_error) = &self.on_error {
            on_error(&error);
        }
        self.display = DisplayState::default();
        self.last_error = Some(error);
        self.phase = Phase::Failed;
    }
}
