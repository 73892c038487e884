//! Resource surcharge resolution.
//!
//! Walks a booking's requested resources and rooms against the resource
//! catalog, producing per-slot costs, per-room additional costs, and
//! custom (externally quoted) line items. Known resource ids dispatch
//! through a handler table; anything else falls through to the default
//! flat/hourly handling, and ids missing from the catalog are skipped.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;

use super::calculators::TimeSplit;
use super::ids::IdGenerator;
use super::models::{Booking, CostLineItem, ResourceConfig, ResourceKind, RuleCatalog};

pub const RES_SECURITY: &str = "security";
pub const RES_FOOD: &str = "food";
pub const RES_BACKLINE: &str = "backline";
pub const RES_PROJECTOR: &str = "projector";
pub const RES_AUDIO_TECH: &str = "audio_tech";
pub const RES_BARTENDER: &str = "bartender";
pub const RES_DOOR_STAFF: &str = "door_staff";
pub const RES_PIANO_TUNING: &str = "piano_tuning";

/// Hours covered by an audio technician's base cost when the catalog
/// entry does not say otherwise.
const DEFAULT_BASE_HOURS: i64 = 7;

/// Output of surcharge resolution for one booking.
#[derive(Debug, Clone, Default)]
pub struct SurchargeBreakdown {
    /// Charges attributed to the whole booking slot.
    pub slot_items: Vec<CostLineItem>,
    /// Externally quoted charges, editable downstream.
    pub custom_items: Vec<CostLineItem>,
    /// Room-scoped charges, keyed by room id.
    pub room_items: HashMap<String, Vec<CostLineItem>>,
}

type Handler = fn(&mut Resolver<'_>, &ResourceConfig);

/// Resource ids with dedicated handling. Adding a billing behavior for a
/// new resource id is an entry here, not a new branch in the engine.
const HANDLERS: &[(&str, Handler)] = &[
    (RES_SECURITY, security),
    (RES_FOOD, cleaning_fee),
    (RES_BACKLINE, per_room),
    (RES_PROJECTOR, per_room),
    (RES_AUDIO_TECH, base_with_overtime),
    (RES_BARTENDER, bartender),
    (RES_DOOR_STAFF, default_resource),
    (RES_PIANO_TUNING, default_resource),
];

fn handler_for(id: &str) -> Handler {
    HANDLERS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, handler)| *handler)
        .unwrap_or(default_resource)
}

/// Resolve all surcharges for one booking against a catalog snapshot.
///
/// Booking-triggered rules (early opening, parking-lot security) run
/// before the requested-resource walk. Re-running with identical inputs
/// yields identical costs and descriptions; only the generated ids vary.
pub fn resolve(
    booking: &Booking,
    split: &TimeSplit,
    catalog: &RuleCatalog,
    ids: &dyn IdGenerator,
) -> SurchargeBreakdown {
    let mut resolver = Resolver {
        booking,
        split,
        catalog,
        ids,
        suppressed: collect_suppressions(booking, catalog),
        security_emitted: false,
        out: SurchargeBreakdown::default(),
    };

    resolver.early_opening();

    // Booking the parking lot forces the security quote even when the
    // resource was never requested.
    if resolver.parking_lot_booked() {
        let config = catalog.resource(RES_SECURITY).cloned();
        resolver.emit_security(config.as_ref());
    }

    for id in &booking.resources {
        match catalog.resource(id) {
            Some(config) => handler_for(id)(&mut resolver, config),
            None => warn!(resource = %id, "requested resource missing from catalog, skipping"),
        }
    }

    resolver.out
}

/// Bundling pre-pass: any requested resource whose room override includes
/// a projector suppresses that room's projector item, regardless of the
/// order resources are processed in.
fn collect_suppressions(booking: &Booking, catalog: &RuleCatalog) -> HashSet<(String, String)> {
    let mut suppressed = HashSet::new();
    for id in &booking.resources {
        let Some(config) = catalog.resource(id) else {
            continue;
        };
        for room in &booking.rooms {
            if let Some(overridden) = config.room_overrides.get(room) {
                if overridden.includes_projector {
                    suppressed.insert((room.clone(), RES_PROJECTOR.to_string()));
                }
            }
        }
    }
    suppressed
}

struct Resolver<'a> {
    booking: &'a Booking,
    split: &'a TimeSplit,
    catalog: &'a RuleCatalog,
    ids: &'a dyn IdGenerator,
    suppressed: HashSet<(String, String)>,
    security_emitted: bool,
    out: SurchargeBreakdown,
}

impl Resolver<'_> {
    fn line_item(
        &self,
        description: String,
        sub_description: Option<String>,
        cost: Decimal,
        is_required: bool,
        is_editable: bool,
    ) -> CostLineItem {
        CostLineItem {
            id: self.ids.next_id(),
            description,
            sub_description,
            cost,
            is_required,
            is_editable,
        }
    }

    fn parking_lot_booked(&self) -> bool {
        self.booking
            .rooms
            .iter()
            .any(|room| *room == self.catalog.settings.parking_lot_room)
    }

    /// Staffing the venue before its opening hour bills per started hour.
    fn early_opening(&mut self) {
        let settings = &self.catalog.settings;
        let opening_time = chrono::NaiveTime::from_hms_opt(settings.opening_hour.min(23), 0, 0)
            .unwrap_or(chrono::NaiveTime::MIN);
        let opening = self.booking.start.date().and_time(opening_time);
        if self.booking.start >= opening {
            return;
        }
        let minutes = (opening - self.booking.start).num_minutes();
        let hours = (minutes + 59) / 60;
        let cost = settings.early_open_rate * Decimal::from(hours);
        let item = self.line_item(
            "Early opening staff".to_string(),
            Some(format!("{hours}h before {}:00 opening", settings.opening_hour)),
            cost,
            true,
            false,
        );
        self.out.slot_items.push(item);
    }

    fn emit_security(&mut self, config: Option<&ResourceConfig>) {
        if self.security_emitted {
            return;
        }
        self.security_emitted = true;
        let description = config
            .map(|c| c.description.clone())
            .unwrap_or_else(|| "Security".to_string());
        let sub_description = config
            .and_then(|c| c.sub_description.clone())
            .or_else(|| Some("Quoted separately".to_string()));
        let item = self.line_item(
            description,
            sub_description,
            Decimal::ZERO,
            self.parking_lot_booked(),
            true,
        );
        self.out.custom_items.push(item);
    }
}

fn security(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    resolver.emit_security(Some(config));
}

fn cleaning_fee(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    let item = resolver.line_item(
        config.description.clone(),
        config.sub_description.clone(),
        config.cost,
        true,
        false,
    );
    resolver.out.slot_items.push(item);
}

/// Room-scoped resources: the room override wins over the base cost, and
/// bundled overrides suppress the projector for that room.
fn per_room(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    for room in resolver.booking.rooms.clone() {
        if resolver
            .suppressed
            .contains(&(room.clone(), config.id.clone()))
        {
            continue;
        }
        let overridden = config.room_overrides.get(&room);
        let cost = overridden.and_then(|o| o.cost).unwrap_or(config.cost);
        let description = overridden
            .and_then(|o| o.description.clone())
            .unwrap_or_else(|| config.description.clone());
        let item = resolver.line_item(
            description,
            config.sub_description.clone(),
            cost,
            false,
            false,
        );
        resolver.out.room_items.entry(room).or_default().push(item);
    }
}

/// Base cost covers a fixed number of hours; the remainder bills as a
/// separate overtime item.
fn base_with_overtime(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    let base_hours = config.base_hours.unwrap_or(DEFAULT_BASE_HOURS);
    let base = resolver.line_item(
        config.description.clone(),
        Some(format!("First {base_hours} hours")),
        config.cost,
        false,
        false,
    );
    resolver.out.slot_items.push(base);

    let overtime_hours = resolver.split.total_hours - base_hours;
    if overtime_hours > 0 {
        if let Some(rate) = config.overtime_rate {
            let item = resolver.line_item(
                format!("{} overtime", config.description),
                Some(format!("{overtime_hours}h beyond the first {base_hours}")),
                rate * Decimal::from(overtime_hours),
                false,
                false,
            );
            resolver.out.slot_items.push(item);
        }
    }
}

/// Comped for large private events, hourly otherwise.
fn bartender(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    let comp_threshold = resolver.catalog.settings.bartender_comp_attendance;
    let comped =
        resolver.booking.is_private && resolver.booking.expected_attendance > comp_threshold;
    let (cost, sub_description) = if comped {
        (
            Decimal::ZERO,
            Some("Complimentary for large private events".to_string()),
        )
    } else {
        (
            config.cost * Decimal::from(resolver.split.total_hours),
            config.sub_description.clone(),
        )
    };
    let item = resolver.line_item(config.description.clone(), sub_description, cost, false, false);
    resolver.out.slot_items.push(item);
}

fn default_resource(resolver: &mut Resolver<'_>, config: &ResourceConfig) {
    match config.kind {
        ResourceKind::Flat => {
            let item = resolver.line_item(
                config.description.clone(),
                config.sub_description.clone(),
                config.cost,
                false,
                false,
            );
            resolver.out.slot_items.push(item);
        }
        ResourceKind::Hourly => {
            let item = resolver.line_item(
                config.description.clone(),
                config.sub_description.clone(),
                config.cost * Decimal::from(resolver.split.total_hours),
                false,
                false,
            );
            resolver.out.slot_items.push(item);
        }
        ResourceKind::Base => base_with_overtime(resolver, config),
        ResourceKind::Custom => {
            let item = resolver.line_item(
                config.description.clone(),
                config.sub_description.clone(),
                Decimal::ZERO,
                false,
                true,
            );
            resolver.out.custom_items.push(item);
        }
    }
}
