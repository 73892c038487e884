//! Request DTOs for pricing API endpoints.

use serde::Deserialize;
use std::collections::HashMap;

/// Request to price a batch of bookings, keyed by rental date.
#[derive(Debug, Deserialize)]
pub struct PriceBatchRequest {
    pub rental_dates: HashMap<String, Vec<BookingRequest>>,
}

/// One booking slot within a pricing request.
///
/// Timestamps arrive as venue-local wall-clock strings (normalization
/// from the caller's timezone happens upstream); validation parses them
/// before any computation.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub id: String,
    pub rooms: Vec<String>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub expected_attendance: i64,
    #[serde(default)]
    pub resources: Vec<String>,
}
