//! Pricing service for venue room bookings.
//!
//! The booking frontend posts batches of requested slots; this service
//! resolves each room's day rule from the catalog, splits the window at
//! the evening boundary, applies surcharges, and returns an itemized
//! estimate with a grand total and tax.

pub mod cache;
pub mod error;
pub mod pricing;

use cache::AppCache;
use pricing::store::CatalogStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: AppCache,
    pub catalog_store: CatalogStore,
}
