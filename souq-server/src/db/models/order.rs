//! Order Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentMethod};
use surrealdb::RecordId;

/// A single order line.
///
/// Unit price and category label are captured from the product at order
/// time; later catalog changes never affect placed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub category_label: String,
}

/// Order entity as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Record id, assigned by the storage layer at creation.
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Human-readable day-scoped number, `YYMMDD-NNNN`. Unique, immutable.
    pub order_number: String,
    /// Opaque unique tracking token shown to customers.
    pub tracking_number: String,
    pub store_id: String,
    pub user_id: String,
    pub address_id: String,
    pub username: String,
    pub phone_number: String,
    pub items: Vec<OrderItem>,
    pub items_price: f64,
    pub delivery_fee: f64,
    /// Invariant: items_price + delivery_fee, computed once at intake.
    pub order_total: f64,
    pub status: OrderStatus,
    /// Present only while status == ready; cleared by verified delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_code: Option<String>,
    /// Settable exactly once, only on a delivered order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_comment: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_delivery_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Bare record key (without the table prefix), if assigned.
    pub fn key(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.key().to_string())
    }
}
