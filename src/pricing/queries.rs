//! Database queries for the catalog store.
//!
//! All queries use runtime-checked sqlx against the pricing schema.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::{ResourceRow, RoomRuleRow, VenueSettingsRow};

/// All per-room, per-weekday rule rows.
pub async fn get_room_rules(pool: &PgPool) -> Result<Vec<RoomRuleRow>, AppError> {
    let rows = sqlx::query_as::<_, RoomRuleRow>(
        r#"
        SELECT room_id, weekday, rule
        FROM pricing_room_rule
        WHERE deleted_at IS NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// All active resource-catalog entries.
pub async fn get_resources(pool: &PgPool) -> Result<Vec<ResourceRow>, AppError> {
    let rows = sqlx::query_as::<_, ResourceRow>(
        r#"
        SELECT id, config
        FROM pricing_resource
        WHERE active = true AND deleted_at IS NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Venue settings singleton.
pub async fn get_venue_settings(pool: &PgPool) -> Result<Option<VenueSettingsRow>, AppError> {
    let row = sqlx::query_as::<_, VenueSettingsRow>(
        r#"
        SELECT config
        FROM pricing_venue_settings
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
