//! Booking pricing orchestration.
//!
//! [`price_booking`] turns one booking request plus a catalog snapshot
//! into a cost estimate; [`price_batch`] prices every booking of a
//! request, isolating per-booking failures and rolling up the grand total
//! with tax. Pricing is pure over the snapshot, so the batch fans out
//! across threads and the grand total does not depend on execution order.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use rust_decimal::Decimal;

use super::calculators::{price_room, round_money, split_at_boundary};
use super::ids::IdGenerator;
use super::models::{
    weekday_key, Booking, BookingCostEstimate, PricedBatch, RoomPriceEstimate, RuleCatalog,
};
use super::requests::{BookingRequest, PriceBatchRequest};
use super::surcharges;

/// Pricing failure scoped to a single booking.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    #[error("invalid booking {booking_id}: {message}")]
    Validation { booking_id: String, message: String },

    #[error("no day rule for room '{room}' on {weekday}")]
    RuleNotFound { room: String, weekday: String },
}

/// Timestamp formats accepted for booking windows (venue-local wall clock).
const TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

fn parse_local(value: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn validate(request: &BookingRequest, date_key: &str) -> Result<Booking, PricingError> {
    let invalid = |message: String| PricingError::Validation {
        booking_id: request.id.clone(),
        message,
    };

    let date = NaiveDate::parse_from_str(date_key, "%Y-%m-%d")
        .map_err(|_| invalid(format!("unparseable rental date '{date_key}'")))?;
    if request.rooms.is_empty() {
        return Err(invalid("at least one room is required".to_string()));
    }
    let start = parse_local(&request.start)
        .ok_or_else(|| invalid(format!("unparseable start time '{}'", request.start)))?;
    let end = parse_local(&request.end)
        .ok_or_else(|| invalid(format!("unparseable end time '{}'", request.end)))?;
    if start >= end {
        return Err(invalid("start must precede end".to_string()));
    }

    Ok(Booking {
        id: request.id.clone(),
        rooms: request.rooms.clone(),
        start,
        end,
        is_private: request.is_private,
        expected_attendance: request.expected_attendance,
        resources: request.resources.clone(),
        date,
    })
}

/// Price one booking against a catalog snapshot.
///
/// Fails with [`PricingError::Validation`] before any computation when
/// required fields are missing or malformed, and with
/// [`PricingError::RuleNotFound`] when any room has no rule for the
/// booking's weekday (and no "all" fallback).
pub fn price_booking(
    request: &BookingRequest,
    date_key: &str,
    catalog: &RuleCatalog,
    ids: &dyn IdGenerator,
) -> Result<BookingCostEstimate, PricingError> {
    let booking = validate(request, date_key)?;
    let weekday = booking.start.weekday();
    let split = split_at_boundary(
        booking.start,
        booking.end,
        catalog.settings.evening_boundary_hour,
    );

    // Resolve every room's rule up front so one unpriceable room fails the
    // whole booking rather than half-pricing it.
    let mut rules = Vec::with_capacity(booking.rooms.len());
    for room in &booking.rooms {
        let rule = catalog
            .room_rules(room)
            .and_then(|set| set.resolve(weekday))
            .ok_or_else(|| PricingError::RuleNotFound {
                room: room.clone(),
                weekday: weekday_key(weekday).to_string(),
            })?;
        rules.push((room.clone(), rule));
    }

    let mut breakdown = surcharges::resolve(&booking, &split, catalog, ids);

    let mut rooms = Vec::with_capacity(rules.len());
    let mut slot_total = Decimal::ZERO;
    for (room, rule) in rules {
        let pricing = price_room(rule, &split, booking.is_private);
        let additional_costs = breakdown.room_items.remove(&room).unwrap_or_default();
        let additional_total: Decimal = additional_costs.iter().map(|item| item.cost).sum();
        let total_cost = pricing.base_price + additional_total;
        slot_total += total_cost;
        rooms.push(RoomPriceEstimate {
            room,
            base_price: pricing.base_price,
            daytime_hours: pricing.daytime_hours,
            daytime_price: pricing.daytime_price,
            evening_hours: pricing.evening_hours,
            evening_price: pricing.evening_price,
            full_day_price: pricing.full_day_price,
            applied_rate: pricing.applied_rate,
            rate_kind: pricing.rate_kind,
            additional_costs,
            total_cost,
        });
    }

    slot_total += breakdown
        .slot_items
        .iter()
        .chain(breakdown.custom_items.iter())
        .map(|item| item.cost)
        .sum::<Decimal>();

    Ok(BookingCostEstimate {
        booking_id: booking.id,
        date: date_key.to_string(),
        start: Some(booking.start),
        end: Some(booking.end),
        rooms,
        slot_costs: breakdown.slot_items,
        custom_line_items: breakdown.custom_items,
        slot_total,
        error: None,
    })
}

/// Tax is a pure function of the grand total; rounded to cents.
pub fn compute_tax(grand_total: Decimal, rate: Decimal) -> Decimal {
    round_money(grand_total * rate, 2)
}

/// Price every booking of a request and roll up the totals.
///
/// Bookings run in parallel; failures are converted into error-carrying
/// estimates with a zero slot total and never abort sibling bookings.
/// Estimates come back grouped by ascending rental date, preserving the
/// request's order within each date.
pub fn price_batch(
    request: &PriceBatchRequest,
    catalog: &RuleCatalog,
    ids: &dyn IdGenerator,
) -> PricedBatch {
    let mut date_keys: Vec<&String> = request.rental_dates.keys().collect();
    date_keys.sort();

    let flattened: Vec<(&str, &BookingRequest)> = date_keys
        .into_iter()
        .flat_map(|date_key| {
            request.rental_dates[date_key]
                .iter()
                .map(move |booking| (date_key.as_str(), booking))
        })
        .collect();

    let estimates: Vec<BookingCostEstimate> = flattened
        .par_iter()
        .map(|&(date_key, booking)| {
            price_booking(booking, date_key, catalog, ids).unwrap_or_else(|err| {
                tracing::warn!(booking_id = %booking.id, "booking failed to price: {err}");
                BookingCostEstimate::failed(
                    booking.id.clone(),
                    date_key.to_string(),
                    err.to_string(),
                )
            })
        })
        .collect();

    let grand_total: Decimal = estimates.iter().map(|estimate| estimate.slot_total).sum();
    let tax = compute_tax(grand_total, catalog.settings.tax_rate);
    let total_with_tax = round_money(grand_total + tax, 2);

    PricedBatch {
        estimates,
        grand_total,
        tax,
        total_with_tax,
    }
}
