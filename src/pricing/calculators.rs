//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access. Splitting a
//! booking window at the evening boundary and applying a day rule to the
//! split are the heart of the engine; everything here is deterministic
//! over its inputs.

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{DayRule, RateKind};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use hallbooking_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// A booking window split at the venue's evening boundary.
///
/// Hours are whole-hour truncated differences between instants (billing is
/// hour-granular). A segment can have positive duration but zero whole
/// hours; flat rates still apply to such a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSplit {
    pub daytime_start: NaiveDateTime,
    pub daytime_end: NaiveDateTime,
    pub evening_start: NaiveDateTime,
    pub evening_end: NaiveDateTime,
    pub daytime_hours: i64,
    pub evening_hours: i64,
    pub total_hours: i64,
    pub crosses_boundary: bool,
}

impl TimeSplit {
    pub fn has_daytime(&self) -> bool {
        self.daytime_end > self.daytime_start
    }

    pub fn has_evening(&self) -> bool {
        self.evening_end > self.evening_start
    }
}

/// Split a booking window at the evening boundary hour on the start date.
///
/// A booking crosses the boundary only when both segments are non-empty:
/// `start < boundary < end`. Ending exactly on the boundary leaves an
/// empty evening segment and no crossover.
pub fn split_at_boundary(start: NaiveDateTime, end: NaiveDateTime, boundary_hour: u32) -> TimeSplit {
    let boundary_time =
        NaiveTime::from_hms_opt(boundary_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let boundary = start.date().and_time(boundary_time);
    let total_hours = hours_between(start, end);

    if start < boundary && boundary < end {
        TimeSplit {
            daytime_start: start,
            daytime_end: boundary,
            evening_start: boundary,
            evening_end: end,
            daytime_hours: hours_between(start, boundary),
            evening_hours: hours_between(boundary, end),
            total_hours,
            crosses_boundary: true,
        }
    } else if end <= boundary {
        TimeSplit {
            daytime_start: start,
            daytime_end: end,
            evening_start: end,
            evening_end: end,
            daytime_hours: total_hours,
            evening_hours: 0,
            total_hours,
            crosses_boundary: false,
        }
    } else {
        TimeSplit {
            daytime_start: start,
            daytime_end: start,
            evening_start: start,
            evening_end: end,
            daytime_hours: 0,
            evening_hours: total_hours,
            total_hours,
            crosses_boundary: false,
        }
    }
}

/// Whole-hour truncated difference between two instants.
fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_hours().max(0)
}

/// Per-room price fragment produced by [`price_room`].
#[derive(Debug, Clone)]
pub struct RoomPricing {
    pub base_price: Decimal,
    pub daytime_hours: i64,
    pub daytime_price: Decimal,
    pub evening_hours: i64,
    pub evening_price: Decimal,
    pub full_day_price: Option<Decimal>,
    pub applied_rate: Decimal,
    pub rate_kind: RateKind,
    pub crossover_applied: bool,
    pub minimum_applied: bool,
}

/// Apply a resolved day rule to a time split.
///
/// A full-day rate short-circuits the period logic entirely. Otherwise
/// each period prices independently; a crossover rate on the daytime
/// period replaces its regular rate and disables minimum-hour floors
/// (both the per-period one and the whole-booking one).
pub fn price_room(rule: &DayRule, split: &TimeSplit, is_private: bool) -> RoomPricing {
    if let Some(full_day) = &rule.full_day {
        let rate = full_day.rate_for(is_private);
        let price = match full_day.kind {
            RateKind::Flat => rate,
            RateKind::Hourly => {
                let hours = split.total_hours.max(full_day.minimum_hours.unwrap_or(0));
                rate * Decimal::from(hours)
            }
        };
        return RoomPricing {
            base_price: price,
            daytime_hours: 0,
            daytime_price: Decimal::ZERO,
            evening_hours: 0,
            evening_price: Decimal::ZERO,
            full_day_price: Some(price),
            applied_rate: rate,
            rate_kind: full_day.kind,
            crossover_applied: false,
            minimum_applied: false,
        };
    }

    let mut daytime_price = Decimal::ZERO;
    let mut evening_price = Decimal::ZERO;
    let mut primary: Option<(Decimal, RateKind)> = None;
    let mut crossover_applied = false;

    if split.has_daytime() {
        if let Some(daytime) = &rule.daytime {
            let mut rate = daytime.rate_for(is_private);
            let mut minimum = daytime.minimum_hours;
            if split.crosses_boundary {
                if let Some(crossover) = daytime.crossover_rate {
                    rate = crossover;
                    minimum = None;
                    crossover_applied = true;
                }
            }
            daytime_price = match daytime.kind {
                RateKind::Flat => rate,
                RateKind::Hourly => {
                    Decimal::from(split.daytime_hours.max(minimum.unwrap_or(0))) * rate
                }
            };
            primary = Some((rate, daytime.kind));
        }
    }

    if split.has_evening() {
        if let Some(evening) = &rule.evening {
            let rate = evening.rate_for(is_private);
            evening_price = match evening.kind {
                RateKind::Flat => rate,
                RateKind::Hourly => {
                    Decimal::from(split.evening_hours.max(evening.minimum_hours.unwrap_or(0)))
                        * rate
                }
            };
            primary.get_or_insert((rate, evening.kind));
        }
    }

    let mut base_price = daytime_price + evening_price;
    let mut minimum_applied = false;

    // Whole-booking floor scales the computed price as if the booking ran
    // the minimum number of hours; crossover pricing excludes it.
    if !crossover_applied {
        if let Some(min_hours) = rule.minimum_hours {
            if split.total_hours > 0 && split.total_hours < min_hours {
                let scale = Decimal::from(min_hours) / Decimal::from(split.total_hours);
                let floored = round_money(base_price * scale, 2);
                if floored > base_price {
                    // Redistribute for display; the evening component takes
                    // any rounding remainder so the parts still sum.
                    daytime_price = round_money(daytime_price * scale, 2);
                    evening_price = floored - daytime_price;
                    base_price = floored;
                    minimum_applied = true;
                }
            }
        }
    }

    let (applied_rate, rate_kind) = primary.unwrap_or((Decimal::ZERO, RateKind::Hourly));

    RoomPricing {
        base_price,
        daytime_hours: split.daytime_hours,
        daytime_price,
        evening_hours: split.evening_hours,
        evening_price,
        full_day_price: None,
        applied_rate,
        rate_kind,
        crossover_applied,
        minimum_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{FullDayRate, PeriodRate};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn hourly(public_rate: Decimal) -> PeriodRate {
        PeriodRate {
            public_rate,
            private_rate: public_rate,
            kind: RateKind::Hourly,
            minimum_hours: None,
            crossover_rate: None,
        }
    }

    fn flat(public_rate: Decimal) -> PeriodRate {
        PeriodRate {
            public_rate,
            private_rate: public_rate,
            kind: RateKind::Flat,
            minimum_hours: None,
            crossover_rate: None,
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    // ==================== split_at_boundary tests ====================

    #[test]
    fn test_split_entirely_before_boundary() {
        let split = split_at_boundary(at(3, 10, 0), at(3, 15, 0), 17);
        assert!(!split.crosses_boundary);
        assert_eq!(split.daytime_hours, 5);
        assert_eq!(split.evening_hours, 0);
        assert_eq!(split.total_hours, 5);
        assert!(split.has_daytime());
        assert!(!split.has_evening());
    }

    #[test]
    fn test_split_entirely_after_boundary() {
        let split = split_at_boundary(at(3, 18, 0), at(3, 22, 0), 17);
        assert!(!split.crosses_boundary);
        assert_eq!(split.daytime_hours, 0);
        assert_eq!(split.evening_hours, 4);
        assert!(!split.has_daytime());
        assert!(split.has_evening());
    }

    #[test]
    fn test_split_crossing_boundary() {
        let split = split_at_boundary(at(3, 15, 0), at(3, 19, 0), 17);
        assert!(split.crosses_boundary);
        assert_eq!(split.daytime_hours, 2);
        assert_eq!(split.evening_hours, 2);
        assert_eq!(split.daytime_end, at(3, 17, 0));
        assert_eq!(split.evening_start, at(3, 17, 0));
    }

    #[test]
    fn test_split_ending_exactly_on_boundary_does_not_cross() {
        let split = split_at_boundary(at(3, 13, 0), at(3, 17, 0), 17);
        assert!(!split.crosses_boundary);
        assert_eq!(split.daytime_hours, 4);
        assert_eq!(split.evening_hours, 0);
    }

    #[test]
    fn test_split_starting_exactly_on_boundary_is_all_evening() {
        let split = split_at_boundary(at(3, 17, 0), at(3, 21, 0), 17);
        assert!(!split.crosses_boundary);
        assert_eq!(split.daytime_hours, 0);
        assert_eq!(split.evening_hours, 4);
    }

    #[test]
    fn test_split_truncates_partial_hours() {
        let split = split_at_boundary(at(3, 10, 30), at(3, 13, 15), 17);
        assert_eq!(split.total_hours, 2);
        assert_eq!(split.daytime_hours, 2);
    }

    #[test]
    fn test_split_sub_hour_crossing_keeps_positive_durations() {
        let split = split_at_boundary(at(3, 16, 30), at(3, 17, 30), 17);
        assert!(split.crosses_boundary);
        assert_eq!(split.daytime_hours, 0);
        assert_eq!(split.evening_hours, 0);
        assert!(split.has_daytime());
        assert!(split.has_evening());
    }

    // ==================== price_room tests ====================

    #[test]
    fn test_daytime_only_hourly() {
        // Scenario: $50/hr public daytime, 10:00-15:00, no crossover
        let rule = DayRule {
            daytime: Some(hourly(dec!(50))),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 10, 0), at(3, 15, 0), 17);
        let pricing = price_room(&rule, &split, false);

        assert_eq!(pricing.base_price, dec!(250));
        assert_eq!(pricing.daytime_price, dec!(250));
        assert_eq!(pricing.evening_price, dec!(0));
        assert_eq!(pricing.applied_rate, dec!(50));
        assert_eq!(pricing.rate_kind, RateKind::Hourly);
        assert!(!pricing.crossover_applied);
    }

    #[test]
    fn test_private_rate_selected() {
        let rule = DayRule {
            daytime: Some(PeriodRate {
                public_rate: dec!(50),
                private_rate: dec!(80),
                kind: RateKind::Hourly,
                minimum_hours: None,
                crossover_rate: None,
            }),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 10, 0), at(3, 12, 0), 17);
        let pricing = price_room(&rule, &split, true);
        assert_eq!(pricing.base_price, dec!(160));
        assert_eq!(pricing.applied_rate, dec!(80));
    }

    #[test]
    fn test_crossover_rate_with_flat_evening() {
        // Scenario: 15:00-19:00, boundary 17, crossover $70/hr, evening flat $500
        let rule = DayRule {
            daytime: Some(PeriodRate {
                public_rate: dec!(50),
                private_rate: dec!(50),
                kind: RateKind::Hourly,
                minimum_hours: Some(4),
                crossover_rate: Some(dec!(70)),
            }),
            evening: Some(flat(dec!(500))),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 15, 0), at(3, 19, 0), 17);
        let pricing = price_room(&rule, &split, false);

        // Crossover replaces the daytime rate and disables its minimum:
        // 2h x $70, not max(2, 4) x $50.
        assert_eq!(pricing.daytime_price, dec!(140));
        assert_eq!(pricing.evening_price, dec!(500));
        assert_eq!(pricing.base_price, dec!(640));
        assert!(pricing.crossover_applied);
    }

    #[test]
    fn test_per_period_minimum_applies_without_crossover() {
        let rule = DayRule {
            daytime: Some(PeriodRate {
                public_rate: dec!(50),
                private_rate: dec!(50),
                kind: RateKind::Hourly,
                minimum_hours: Some(4),
                crossover_rate: None,
            }),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 10, 0), at(3, 12, 0), 17);
        let pricing = price_room(&rule, &split, false);
        assert_eq!(pricing.base_price, dec!(200)); // max(2, 4) x 50
    }

    #[test]
    fn test_whole_booking_minimum_scales_price() {
        // Scenario: minimum 4h, daytime hourly $40, booking 2h
        let rule = DayRule {
            daytime: Some(hourly(dec!(40))),
            minimum_hours: Some(4),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 10, 0), at(3, 12, 0), 17);
        let pricing = price_room(&rule, &split, false);

        assert_eq!(pricing.base_price, dec!(160)); // 80 x (4/2)
        assert_eq!(pricing.daytime_price, dec!(160));
        assert!(pricing.minimum_applied);
    }

    #[test]
    fn test_whole_booking_minimum_skipped_when_crossover_applied() {
        let rule = DayRule {
            daytime: Some(PeriodRate {
                public_rate: dec!(50),
                private_rate: dec!(50),
                kind: RateKind::Hourly,
                minimum_hours: None,
                crossover_rate: Some(dec!(70)),
            }),
            evening: Some(hourly(dec!(60))),
            minimum_hours: Some(10),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 15, 0), at(3, 19, 0), 17);
        let pricing = price_room(&rule, &split, false);

        // 2 x 70 + 2 x 60, no scaling to 10 hours
        assert_eq!(pricing.base_price, dec!(260));
        assert!(!pricing.minimum_applied);
    }

    #[test]
    fn test_whole_booking_minimum_redistributes_across_periods() {
        let rule = DayRule {
            daytime: Some(hourly(dec!(40))),
            evening: Some(hourly(dec!(60))),
            minimum_hours: Some(6),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 16, 0), at(3, 18, 0), 17);
        let pricing = price_room(&rule, &split, false);

        // Raw: 1 x 40 + 1 x 60 = 100, scaled x3 = 300
        assert_eq!(pricing.base_price, dec!(300));
        assert_eq!(pricing.daytime_price + pricing.evening_price, dec!(300));
        assert_eq!(pricing.daytime_price, dec!(120));
        assert_eq!(pricing.evening_price, dec!(180));
    }

    #[test]
    fn test_full_day_flat_ignores_periods() {
        let rule = DayRule {
            full_day: Some(FullDayRate {
                public_rate: dec!(900),
                private_rate: dec!(1200),
                kind: RateKind::Flat,
                minimum_hours: None,
            }),
            daytime: Some(hourly(dec!(50))),
            evening: Some(flat(dec!(500))),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 15, 0), at(3, 19, 0), 17);
        let pricing = price_room(&rule, &split, false);

        assert_eq!(pricing.base_price, dec!(900));
        assert_eq!(pricing.full_day_price, Some(dec!(900)));
        assert_eq!(pricing.daytime_hours, 0);
        assert_eq!(pricing.evening_hours, 0);
        assert_eq!(pricing.daytime_price, dec!(0));
        assert_eq!(pricing.evening_price, dec!(0));
    }

    #[test]
    fn test_full_day_hourly_honors_minimum() {
        let rule = DayRule {
            full_day: Some(FullDayRate {
                public_rate: dec!(100),
                private_rate: dec!(100),
                kind: RateKind::Hourly,
                minimum_hours: Some(8),
            }),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 10, 0), at(3, 13, 0), 17);
        let pricing = price_room(&rule, &split, false);
        assert_eq!(pricing.base_price, dec!(800)); // max(3, 8) x 100
    }

    #[test]
    fn test_no_applicable_rule_yields_zero() {
        // Configuration gap: rule has no periods at all
        let rule = DayRule::default();
        let split = split_at_boundary(at(3, 10, 0), at(3, 15, 0), 17);
        let pricing = price_room(&rule, &split, false);
        assert_eq!(pricing.base_price, dec!(0));
        assert_eq!(pricing.applied_rate, dec!(0));
    }

    #[test]
    fn test_evening_only_rule_on_daytime_booking_yields_zero() {
        let rule = DayRule {
            evening: Some(flat(dec!(500))),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 9, 0), at(3, 12, 0), 17);
        let pricing = price_room(&rule, &split, false);
        assert_eq!(pricing.base_price, dec!(0));
    }

    #[test]
    fn test_flat_rate_charged_for_sub_hour_segment() {
        let rule = DayRule {
            evening: Some(flat(dec!(500))),
            ..Default::default()
        };
        let split = split_at_boundary(at(3, 17, 0), at(3, 17, 30), 17);
        let pricing = price_room(&rule, &split, false);
        assert_eq!(pricing.evening_price, dec!(500));
        assert_eq!(pricing.evening_hours, 0);
    }
}
