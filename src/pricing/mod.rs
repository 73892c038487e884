//! Pricing engine for venue room bookings.
//!
//! Turns a booking plus a rule-catalog snapshot into an itemized cost
//! estimate: day/evening splitting, crossover rates, minimum-hour floors,
//! full-day overrides, and resource surcharges with per-room overrides and
//! bundling suppression. The booking frontend calls this over HTTP/JSON.

pub mod calculators;
pub mod ids;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;
pub mod surcharges;

// Re-export commonly used items
pub use calculators::{round_money, split_at_boundary};
pub use routes::router;
pub use services::{price_batch, price_booking, PricingError};
