use crate::{MetadataFetcher, PreviewError, RawMetadata, RequestOptions};
use async_trait::async_trait;
use dashmap::DashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Cache {
    cache: Arc<DashMap<String, RawMetadata>>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).map_or(100, NonZeroUsize::get);
        Self {
            cache: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<RawMetadata> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    pub async fn set(&self, key: String, value: RawMetadata) {
        self.cache.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Serves repeated sources from memory. Only successful fetches are kept, so
/// a failed source is retried the next time it is supplied.
#[derive(Clone)]
pub struct CachedFetcher<F> {
    inner: F,
    cache: Cache,
}

impl<F: MetadataFetcher> CachedFetcher<F> {
    pub fn new(inner: F, cache_capacity: usize) -> Self {
        Self {
            inner,
            cache: Cache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

#[async_trait]
impl<F: MetadataFetcher> MetadataFetcher for CachedFetcher<F> {
    async fn fetch_metadata(
        &self,
        text: &str,
        options: &RequestOptions,
    ) -> Result<RawMetadata, PreviewError> {
        if let Some(cached) = self.cache.get(text).await {
            debug!(source = %text, "Serving metadata from cache");
            return Ok(cached);
        }

        let metadata = self.inner.fetch_metadata(text, options).await?;
        self.cache.set(text.to_string(), metadata.clone()).await;
        Ok(metadata)
    }
}
