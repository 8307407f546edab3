//! Directory collaborator models
//!
//! Thin lookup entries for the store, address, product and user
//! directories. The order engine only reads these (and writes the store
//! rating aggregate); full CRUD for them lives outside this service.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::ActorRole;
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreCategory {
    Restaurant,
    Pharmacy,
    Supermarket,
    Other,
}

/// Store directory entry.
///
/// `rating`/`rating_count` live here but are written by the rating
/// aggregator: the mean and count over all delivered, rated orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub category: StoreCategory,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: i64,
}

/// Delivery address entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Delivery zone name.
    pub zone: String,
    /// Free-text address line.
    pub details: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Product catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub unit_price: f64,
    pub category_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// User directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub display_name: String,
    pub phone_number: String,
    pub role: ActorRole,
}
