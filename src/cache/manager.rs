//! Time-based cache for the restructured festival hierarchy
//!
//! Provides a `FestivalCache` that fetches festivals on first use, keeps the
//! restructured result for 24 hours and refetches on the next read after that.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::data::{FestivalSource, FestivalsError, Hierarchy};
use crate::restructure::restructure;

/// How long a populated cache stays fresh, in hours
const TIME_TO_LIVE_HOURS: i64 = 24;

/// A populated cache value and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry {
    hierarchy: Arc<Hierarchy>,
    populated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// True once more than `ttl` has passed since population
    fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - ttl > self.populated_at
    }
}

/// Caches the festival hierarchy fetched from a [`FestivalSource`]
///
/// Reads against a fresh cache only take a shared read lock. When the cache is
/// empty or stale, population runs behind a separate mutex so that concurrent
/// callers trigger a single fetch and all receive the same snapshot. A failed
/// population leaves the previous state untouched.
#[derive(Debug)]
pub struct FestivalCache<S> {
    source: S,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
    populate_lock: Mutex<()>,
}

impl<S: FestivalSource> FestivalCache<S> {
    /// Creates an empty cache with the default 24 hour time-to-live
    pub fn new(source: S) -> Self {
        Self {
            source,
            ttl: Duration::hours(TIME_TO_LIVE_HOURS),
            entry: RwLock::new(None),
            populate_lock: Mutex::new(()),
        }
    }

    /// Overrides the time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The time-to-live of a populated value
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the festival hierarchy, populating the cache if it is empty or stale
    ///
    /// # Returns
    /// * `Ok(Arc<Hierarchy>)` - The sorted hierarchy, shared with other callers
    /// * `Err(FestivalsError)` - If population failed; the cache is left as it was
    pub async fn get_all(&self) -> Result<Arc<Hierarchy>, FestivalsError> {
        if let Some(hierarchy) = self.fresh_value().await {
            return Ok(hierarchy);
        }

        let _populating = self.populate_lock.lock().await;

        // Another caller may have populated while we waited for the lock
        if let Some(hierarchy) = self.fresh_value().await {
            debug!("Cache populated by a concurrent caller");
            return Ok(hierarchy);
        }

        self.populate().await
    }

    /// Returns the cached hierarchy, fresh or stale, without fetching
    pub async fn cached(&self) -> Option<Arc<Hierarchy>> {
        self.entry
            .read()
            .await
            .as_ref()
            .map(|entry| Arc::clone(&entry.hierarchy))
    }

    /// When the cached value was stored, if there is one
    pub async fn populated_at(&self) -> Option<DateTime<Utc>> {
        self.entry.read().await.as_ref().map(|entry| entry.populated_at)
    }

    /// The cached hierarchy if present and within its time-to-live
    async fn fresh_value(&self) -> Option<Arc<Hierarchy>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|entry| !entry.is_stale(self.ttl, Utc::now()))
            .map(|entry| Arc::clone(&entry.hierarchy))
    }

    /// Fetches, restructures and stores a new hierarchy
    ///
    /// Must only be called while holding `populate_lock`.
    async fn populate(&self) -> Result<Arc<Hierarchy>, FestivalsError> {
        let festivals = self.source.fetch_festivals().await?;
        info!(festivals = festivals.len(), "Populating cache with music festivals data");

        let hierarchy = Arc::new(restructure(&festivals));
        let populated_at = Utc::now();

        *self.entry.write().await = Some(CacheEntry {
            hierarchy: Arc::clone(&hierarchy),
            populated_at,
        });
        debug!(
            record_labels = hierarchy.len(),
            %populated_at,
            "Cache populated"
        );

        Ok(hierarchy)
    }
}
