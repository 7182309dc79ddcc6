//! Festival service exposed to the application
//!
//! [`FestivalService`] is the single entry point callers use to obtain the
//! record label hierarchy. The cached implementation is what the binary wires
//! up; the passthrough implementation skips caching entirely.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::cache::FestivalCache;
use crate::data::{FestivalSource, FestivalsError, Hierarchy};
use crate::restructure::restructure;

/// Provides the festival hierarchy
#[async_trait]
pub trait FestivalService: Send + Sync {
    /// Returns all festivals grouped by record label and band, sorted by name
    async fn get_all_festivals(&self) -> Result<Arc<Hierarchy>, FestivalsError>;
}

/// Service that delegates to a shared [`FestivalCache`]
#[derive(Debug)]
pub struct CachedFestivalService<S> {
    cache: Arc<FestivalCache<S>>,
}

impl<S> CachedFestivalService<S> {
    pub fn new(cache: Arc<FestivalCache<S>>) -> Self {
        Self { cache }
    }
}

impl<S> Clone for CachedFestivalService<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[async_trait]
impl<S: FestivalSource> FestivalService for CachedFestivalService<S> {
    async fn get_all_festivals(&self) -> Result<Arc<Hierarchy>, FestivalsError> {
        self.cache.get_all().await
    }
}

/// Service that fetches and restructures on every call
#[derive(Debug)]
pub struct PassthroughFestivalService<S> {
    source: S,
}

impl<S> PassthroughFestivalService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: FestivalSource> FestivalService for PassthroughFestivalService<S> {
    async fn get_all_festivals(&self) -> Result<Arc<Hierarchy>, FestivalsError> {
        debug!("Fetching festivals without cache");
        let festivals = self.source.fetch_festivals().await?;
        Ok(Arc::new(restructure(&festivals)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_festivals, RawFestival};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FIXTURE: &str = include_str!("../tests/fixtures/festivals.json");

    /// Source that always returns the fixture and counts fetches
    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl FestivalSource for CountingSource {
        async fn fetch_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(parse_festivals(FIXTURE).expect("Fixture should parse"))
        }
    }

    /// Source whose response body is never valid
    struct BrokenSource;

    #[async_trait]
    impl FestivalSource for BrokenSource {
        async fn fetch_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError> {
            Err(FestivalsError::Parse {
                status: reqwest::StatusCode::OK,
                source: parse_festivals("not json").unwrap_err(),
            })
        }
    }

    #[tokio::test]
    async fn test_cached_service_delegates_to_cache() {
        let source = Arc::new(CountingSource::default());
        let cache = Arc::new(FestivalCache::new(Arc::clone(&source)));
        let service = CachedFestivalService::new(Arc::clone(&cache));

        let first = service.get_all_festivals().await.unwrap();
        let second = service.clone().get_all_festivals().await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &cache.cached().await.unwrap()));
        assert_eq!(first.record_labels[3].name, "Fourth Woman Records");
    }

    #[tokio::test]
    async fn test_passthrough_service_fetches_every_time() {
        let source = Arc::new(CountingSource::default());
        let service = PassthroughFestivalService::new(Arc::clone(&source));

        let first = service.get_all_festivals().await.unwrap();
        let second = service.get_all_festivals().await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn test_services_are_interchangeable() {
        let services: Vec<Box<dyn FestivalService>> = vec![
            Box::new(CachedFestivalService::new(Arc::new(FestivalCache::new(
                CountingSource::default(),
            )))),
            Box::new(PassthroughFestivalService::new(CountingSource::default())),
        ];

        let mut results = Vec::new();
        for service in &services {
            results.push(service.get_all_festivals().await.unwrap());
        }

        assert_eq!(*results[0], *results[1]);
    }

    #[tokio::test]
    async fn test_parse_error_propagates_unchanged() {
        let service = CachedFestivalService::new(Arc::new(FestivalCache::new(BrokenSource)));

        let err = service.get_all_festivals().await.unwrap_err();

        assert!(err.is_parse_error());
        assert!(err.to_string().contains("HTTP 200"));
    }
}
