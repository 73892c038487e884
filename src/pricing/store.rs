//! Rule catalog store.
//!
//! Loads room rule sets, the resource catalog, and venue settings from
//! Postgres and assembles the immutable [`RuleCatalog`] snapshot the
//! engine works from. The engine itself never touches the database; it
//! receives a fully loaded, internally consistent snapshot for the
//! duration of one pricing run.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::PgPool;
use tracing::warn;

use crate::error::AppError;

use super::models::{DayRule, ResourceConfig, RoomRuleSet, RuleCatalog, VenueSettings};
use super::queries;

const LOAD_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// Postgres-backed catalog store.
#[derive(Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a catalog snapshot, retrying transient failures with
    /// exponential backoff. Exhausting the retry budget is fatal to the
    /// caller's pricing run.
    pub async fn load_with_retry(&self) -> Result<RuleCatalog, AppError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut last_error = String::new();
        for attempt in 1..=LOAD_ATTEMPTS {
            match self.load().await {
                Ok(catalog) => return Ok(catalog),
                Err(e) => {
                    warn!(attempt, "catalog load failed: {}", e);
                    last_error = e.to_string();
                    if attempt < LOAD_ATTEMPTS {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }
        Err(AppError::CatalogUnavailable(last_error))
    }

    /// Single load attempt: three queries assembled into one snapshot.
    pub async fn load(&self) -> Result<RuleCatalog, AppError> {
        let rule_rows = queries::get_room_rules(&self.pool).await?;
        let resource_rows = queries::get_resources(&self.pool).await?;
        let settings_row = queries::get_venue_settings(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::CatalogUnavailable("venue settings row missing".to_string())
            })?;

        let mut rooms: HashMap<String, RoomRuleSet> = HashMap::new();
        for row in rule_rows {
            let rule: DayRule = serde_json::from_value(row.rule)?;
            rooms
                .entry(row.room_id)
                .or_default()
                .days
                .insert(row.weekday, rule);
        }

        let mut resources = HashMap::new();
        for row in resource_rows {
            let mut config: ResourceConfig = serde_json::from_value(row.config)?;
            config.id = row.id.clone();
            resources.insert(row.id, config);
        }

        let settings: VenueSettings = serde_json::from_value(settings_row.config)?;

        Ok(RuleCatalog {
            rooms,
            resources,
            settings,
        })
    }
}
