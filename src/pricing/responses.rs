//! Response DTOs for pricing API endpoints.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::models::{
    BookingCostEstimate, CostLineItem, PricedBatch, RateKind, RoomPriceEstimate,
};

/// Cost line item for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct CostLineItemResponse {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
    pub is_required: bool,
    pub is_editable: bool,
}

impl From<CostLineItem> for CostLineItemResponse {
    fn from(item: CostLineItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            sub_description: item.sub_description,
            cost: item.cost,
            is_required: item.is_required,
            is_editable: item.is_editable,
        }
    }
}

/// Per-room price breakdown in a response
#[derive(Debug, Serialize)]
pub struct RoomPriceEstimateResponse {
    pub room: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    pub daytime_hours: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub daytime_price: Decimal,
    pub evening_hours: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub evening_price: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub full_day_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub applied_rate: Decimal,
    pub rate_kind: RateKind,
    pub additional_costs: Vec<CostLineItemResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
}

impl From<RoomPriceEstimate> for RoomPriceEstimateResponse {
    fn from(estimate: RoomPriceEstimate) -> Self {
        Self {
            room: estimate.room,
            base_price: estimate.base_price,
            daytime_hours: estimate.daytime_hours,
            daytime_price: estimate.daytime_price,
            evening_hours: estimate.evening_hours,
            evening_price: estimate.evening_price,
            full_day_price: estimate.full_day_price,
            applied_rate: estimate.applied_rate,
            rate_kind: estimate.rate_kind,
            additional_costs: estimate
                .additional_costs
                .into_iter()
                .map(Into::into)
                .collect(),
            total_cost: estimate.total_cost,
        }
    }
}

/// One priced booking slot in a response
#[derive(Debug, Serialize)]
pub struct BookingCostEstimateResponse {
    pub booking_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    pub rooms: Vec<RoomPriceEstimateResponse>,
    pub slot_costs: Vec<CostLineItemResponse>,
    pub custom_line_items: Vec<CostLineItemResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub slot_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BookingCostEstimate> for BookingCostEstimateResponse {
    fn from(estimate: BookingCostEstimate) -> Self {
        Self {
            booking_id: estimate.booking_id,
            date: estimate.date,
            start: estimate.start,
            end: estimate.end,
            rooms: estimate.rooms.into_iter().map(Into::into).collect(),
            slot_costs: estimate.slot_costs.into_iter().map(Into::into).collect(),
            custom_line_items: estimate
                .custom_line_items
                .into_iter()
                .map(Into::into)
                .collect(),
            slot_total: estimate.slot_total,
            error: estimate.error,
        }
    }
}

/// Response for a priced batch
#[derive(Debug, Serialize)]
pub struct PriceBatchResponse {
    pub cost_estimates: Vec<BookingCostEstimateResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub grand_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_with_tax: Decimal,
    /// Externally quoted items indexed by booking id, for the estimate
    /// editor.
    pub custom_line_items: HashMap<String, Vec<CostLineItemResponse>>,
}

impl From<PricedBatch> for PriceBatchResponse {
    fn from(batch: PricedBatch) -> Self {
        let mut custom_line_items: HashMap<String, Vec<CostLineItemResponse>> = HashMap::new();
        let cost_estimates = batch
            .estimates
            .into_iter()
            .map(|estimate| {
                if !estimate.custom_line_items.is_empty() {
                    custom_line_items.insert(
                        estimate.booking_id.clone(),
                        estimate
                            .custom_line_items
                            .iter()
                            .cloned()
                            .map(Into::into)
                            .collect(),
                    );
                }
                estimate.into()
            })
            .collect();

        Self {
            cost_estimates,
            grand_total: batch.grand_total,
            tax: batch.tax,
            total_with_tax: batch.total_with_tax,
            custom_line_items,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
