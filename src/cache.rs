//! In-memory caching using moka
//!
//! Holds the assembled rule-catalog snapshot so pricing requests do not
//! hit the database on every call. Rates change rarely; a short TTL keeps
//! catalog edits visible within minutes.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::error::AppError;
use crate::pricing::models::RuleCatalog;
use crate::pricing::store::CatalogStore;

const CATALOG_KEY: &str = "catalog";

/// Application cache holding the catalog snapshot
#[derive(Clone)]
pub struct AppCache {
    /// Assembled catalog snapshots (singleton key)
    pub catalog: Cache<String, Arc<RuleCatalog>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Catalog snapshot: 1 entry, 10 min TTL
            catalog: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    /// Cached snapshot if present, otherwise load through the store (with
    /// its retry policy) and cache the result.
    pub async fn catalog_snapshot(
        &self,
        store: &CatalogStore,
    ) -> Result<Arc<RuleCatalog>, AppError> {
        if let Some(cached) = self.catalog.get(CATALOG_KEY).await {
            tracing::debug!("Cache HIT for rule catalog");
            return Ok(cached);
        }
        tracing::debug!("Cache MISS for rule catalog");
        let snapshot = Arc::new(store.load_with_retry().await?);
        self.catalog
            .insert(CATALOG_KEY.to_string(), snapshot.clone())
            .await;
        Ok(snapshot)
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalog_cached: self.catalog.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.catalog.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub catalog_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, store: CatalogStore) {
    warm_cache(&cache, &store).await;

    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &store).await;
    }
}

/// Warm the cache with a fresh catalog snapshot
async fn warm_cache(cache: &AppCache, store: &CatalogStore) {
    info!("Starting catalog warm-up...");

    match store.load_with_retry().await {
        Ok(catalog) => {
            cache
                .catalog
                .insert(CATALOG_KEY.to_string(), Arc::new(catalog))
                .await;
            info!("Catalog warm-up complete");
        }
        Err(e) => warn!("Failed to warm catalog cache: {}", e),
    }
}
