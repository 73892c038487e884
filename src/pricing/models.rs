//! Domain model for the booking pricing engine.
//!
//! Rule and catalog shapes deserialize from the `jsonb` columns the
//! catalog store reads; estimate shapes are produced by the engine and
//! never mutated after construction.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sentinel weekday key matching every day a room has no explicit rule for.
pub const ALL_DAYS: &str = "all";

/// How a rate applies to a booking segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    Flat,
    Hourly,
}

/// How a resource surcharge is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Fixed cost regardless of booking length.
    Flat,
    /// Catalog rate times total booking hours.
    Hourly,
    /// Base cost covers a fixed number of hours; the remainder bills as
    /// overtime.
    Base,
    /// Quoted outside the engine; emitted at zero cost and editable.
    Custom,
}

/// Rate for one daily period (daytime or evening) of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRate {
    pub public_rate: Decimal,
    pub private_rate: Decimal,
    pub kind: RateKind,
    #[serde(default)]
    pub minimum_hours: Option<i64>,
    /// Alternate rate used when the daytime segment runs straight into an
    /// evening segment of the same booking. Only meaningful on the daytime
    /// period; mutually exclusive with the minimum-hour floor.
    #[serde(default)]
    pub crossover_rate: Option<Decimal>,
}

impl PeriodRate {
    pub fn rate_for(&self, is_private: bool) -> Decimal {
        if is_private {
            self.private_rate
        } else {
            self.public_rate
        }
    }
}

/// Whole-day rate that overrides daytime/evening pricing when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullDayRate {
    pub public_rate: Decimal,
    pub private_rate: Decimal,
    pub kind: RateKind,
    #[serde(default)]
    pub minimum_hours: Option<i64>,
}

impl FullDayRate {
    pub fn rate_for(&self, is_private: bool) -> Decimal {
        if is_private {
            self.private_rate
        } else {
            self.public_rate
        }
    }
}

/// Pricing configuration for one room on one weekday (or the "all"
/// fallback). `full_day` always wins when present; the daytime/evening
/// periods are evaluated only in its absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayRule {
    #[serde(default)]
    pub full_day: Option<FullDayRate>,
    #[serde(default)]
    pub daytime: Option<PeriodRate>,
    #[serde(default)]
    pub evening: Option<PeriodRate>,
    /// Whole-booking minimum-hour floor.
    #[serde(default)]
    pub minimum_hours: Option<i64>,
}

/// Weekday rules for one room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomRuleSet {
    pub days: HashMap<String, DayRule>,
}

impl RoomRuleSet {
    /// Exact weekday first, then the "all" fallback.
    pub fn resolve(&self, weekday: Weekday) -> Option<&DayRule> {
        self.days
            .get(weekday_key(weekday))
            .or_else(|| self.days.get(ALL_DAYS))
    }
}

/// Lowercase weekday name used as a rule-table key.
pub fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Room-specific override for a resource surcharge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomOverride {
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    /// Bundling flag: the override already covers a projector, so a
    /// separately requested projector is suppressed for this room.
    #[serde(default)]
    pub includes_projector: bool,
}

/// One entry of the resource-cost catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub id: String,
    pub cost: Decimal,
    pub kind: ResourceKind,
    pub description: String,
    #[serde(default)]
    pub sub_description: Option<String>,
    /// Hours covered by the base cost of a `ResourceKind::Base` resource.
    #[serde(default)]
    pub base_hours: Option<i64>,
    /// Hourly rate for hours beyond `base_hours`.
    #[serde(default)]
    pub overtime_rate: Option<Decimal>,
    #[serde(default)]
    pub room_overrides: HashMap<String, RoomOverride>,
}

/// Venue-level pricing constants, stored alongside the rule catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSettings {
    /// Local hour at which evening pricing begins.
    #[serde(default = "default_evening_boundary")]
    pub evening_boundary_hour: u32,
    /// Local hour the venue opens without extra staffing.
    #[serde(default = "default_opening_hour")]
    pub opening_hour: u32,
    /// Hourly rate for staffing the venue before opening.
    #[serde(default)]
    pub early_open_rate: Decimal,
    /// Private events above this head count get the bartender comped.
    #[serde(default = "default_comp_attendance")]
    pub bartender_comp_attendance: i64,
    /// Room whose booking makes the security quote mandatory.
    #[serde(default = "default_parking_lot_room")]
    pub parking_lot_room: String,
    pub tax_rate: Decimal,
}

fn default_evening_boundary() -> u32 {
    17
}

fn default_opening_hour() -> u32 {
    8
}

fn default_comp_attendance() -> i64 {
    100
}

fn default_parking_lot_room() -> String {
    "parking-lot".to_string()
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            evening_boundary_hour: default_evening_boundary(),
            opening_hour: default_opening_hour(),
            early_open_rate: Decimal::ZERO,
            bartender_comp_attendance: default_comp_attendance(),
            parking_lot_room: default_parking_lot_room(),
            tax_rate: Decimal::ZERO,
        }
    }
}

/// Immutable catalog snapshot handed to the engine for one pricing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCatalog {
    pub rooms: HashMap<String, RoomRuleSet>,
    pub resources: HashMap<String, ResourceConfig>,
    #[serde(default)]
    pub settings: VenueSettings,
}

impl RuleCatalog {
    pub fn room_rules(&self, room: &str) -> Option<&RoomRuleSet> {
        self.rooms.get(room)
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceConfig> {
        self.resources.get(id)
    }
}

/// A booking request that passed validation.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: String,
    pub rooms: Vec<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_private: bool,
    pub expected_attendance: i64,
    pub resources: Vec<String>,
    pub date: NaiveDate,
}

/// One itemized charge. Immutable once produced; the id is opaque and
/// never participates in totals.
#[derive(Debug, Clone)]
pub struct CostLineItem {
    pub id: String,
    pub description: String,
    pub sub_description: Option<String>,
    pub cost: Decimal,
    pub is_required: bool,
    pub is_editable: bool,
}

/// Priced result for one room of a booking.
#[derive(Debug, Clone)]
pub struct RoomPriceEstimate {
    pub room: String,
    pub base_price: Decimal,
    pub daytime_hours: i64,
    pub daytime_price: Decimal,
    pub evening_hours: i64,
    pub evening_price: Decimal,
    pub full_day_price: Option<Decimal>,
    pub applied_rate: Decimal,
    pub rate_kind: RateKind,
    pub additional_costs: Vec<CostLineItem>,
    pub total_cost: Decimal,
}

/// Priced result for one booking slot. On failure the estimate carries an
/// error message and a zero slot total instead of aborting the batch.
#[derive(Debug, Clone)]
pub struct BookingCostEstimate {
    pub booking_id: String,
    pub date: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub rooms: Vec<RoomPriceEstimate>,
    pub slot_costs: Vec<CostLineItem>,
    pub custom_line_items: Vec<CostLineItem>,
    pub slot_total: Decimal,
    pub error: Option<String>,
}

impl BookingCostEstimate {
    /// Error-carrying replacement for a booking that failed to price.
    pub fn failed(booking_id: String, date: String, message: String) -> Self {
        Self {
            booking_id,
            date,
            start: None,
            end: None,
            rooms: Vec::new(),
            slot_costs: Vec::new(),
            custom_line_items: Vec::new(),
            slot_total: Decimal::ZERO,
            error: Some(message),
        }
    }
}

/// A fully priced batch of bookings.
#[derive(Debug, Clone)]
pub struct PricedBatch {
    pub estimates: Vec<BookingCostEstimate>,
    pub grand_total: Decimal,
    pub tax: Decimal,
    pub total_with_tax: Decimal,
}

/// Room rule row from pricing_room_rule
#[derive(Debug, Clone, FromRow)]
pub struct RoomRuleRow {
    pub room_id: String,
    pub weekday: String,
    pub rule: serde_json::Value,
}

/// Resource row from pricing_resource
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: String,
    pub config: serde_json::Value,
}

/// Venue settings singleton row from pricing_venue_settings
#[derive(Debug, Clone, FromRow)]
pub struct VenueSettingsRow {
    pub config: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_rule_set_prefers_exact_weekday() {
        let mut days = HashMap::new();
        days.insert(
            "monday".to_string(),
            DayRule {
                minimum_hours: Some(2),
                ..Default::default()
            },
        );
        days.insert(
            ALL_DAYS.to_string(),
            DayRule {
                minimum_hours: Some(9),
                ..Default::default()
            },
        );
        let set = RoomRuleSet { days };

        assert_eq!(
            set.resolve(Weekday::Mon).and_then(|r| r.minimum_hours),
            Some(2)
        );
        assert_eq!(
            set.resolve(Weekday::Tue).and_then(|r| r.minimum_hours),
            Some(9)
        );
    }

    #[test]
    fn test_rule_set_missing_weekday_and_fallback() {
        let set = RoomRuleSet::default();
        assert!(set.resolve(Weekday::Fri).is_none());
    }

    #[test]
    fn test_day_rule_deserializes_from_catalog_json() {
        let rule: DayRule = serde_json::from_value(json!({
            "daytime": {
                "public_rate": 50,
                "private_rate": 65,
                "kind": "hourly",
                "crossover_rate": "70"
            },
            "evening": {
                "public_rate": "500",
                "private_rate": "600",
                "kind": "flat"
            },
            "minimum_hours": 4
        }))
        .expect("rule should deserialize");

        let daytime = rule.daytime.expect("daytime present");
        assert_eq!(daytime.public_rate, dec!(50));
        assert_eq!(daytime.kind, RateKind::Hourly);
        assert_eq!(daytime.crossover_rate, Some(dec!(70)));
        let evening = rule.evening.expect("evening present");
        assert_eq!(evening.kind, RateKind::Flat);
        assert_eq!(evening.public_rate, dec!(500));
        assert_eq!(rule.minimum_hours, Some(4));
        assert!(rule.full_day.is_none());
    }

    #[test]
    fn test_resource_config_deserializes_with_overrides() {
        let config: ResourceConfig = serde_json::from_value(json!({
            "cost": "150",
            "kind": "flat",
            "description": "Backline",
            "room_overrides": {
                "living-room": {
                    "cost": "200",
                    "description": "House backline (incl. projector)",
                    "includes_projector": true
                }
            }
        }))
        .expect("config should deserialize");

        assert_eq!(config.cost, dec!(150));
        assert_eq!(config.kind, ResourceKind::Flat);
        let ov = config.room_overrides.get("living-room").expect("override");
        assert_eq!(ov.cost, Some(dec!(200)));
        assert!(ov.includes_projector);
    }

    #[test]
    fn test_venue_settings_defaults() {
        let settings: VenueSettings =
            serde_json::from_value(json!({ "tax_rate": "0.0825" })).expect("settings");
        assert_eq!(settings.evening_boundary_hour, 17);
        assert_eq!(settings.opening_hour, 8);
        assert_eq!(settings.parking_lot_room, "parking-lot");
        assert_eq!(settings.tax_rate, dec!(0.0825));
    }

    #[test]
    fn test_weekday_keys_cover_the_week() {
        assert_eq!(weekday_key(Weekday::Mon), "monday");
        assert_eq!(weekday_key(Weekday::Sun), "sunday");
    }
}
