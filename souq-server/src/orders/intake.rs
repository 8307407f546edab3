//! Order Intake Service
//!
//! Builds a new order from cart input: validates the request, resolves the
//! store/address/product/user collaborators, captures authoritative prices,
//! assigns identifiers and persists the order in `pending`. No payment is
//! taken here.

use crate::db::models::{Order, OrderItem};
use crate::db::repository::{
    AddressRepository, OrderRepository, ProductRepository, RepoError, StoreRepository,
    UserRepository,
};
use crate::feed::OrderFeed;
use crate::orders::error::{OrderError, OrderResult};
use crate::orders::money;
use crate::orders::sequence::SequenceNumberGenerator;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_len,
    validate_required_text};
use serde::Deserialize;
use shared::feed::OrderFeedEvent;
use shared::{OrderStatus, PaymentMethod};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Bounded retries when an allocated identifier collides at insert time.
const MAX_CREATE_ATTEMPTS: u32 = 3;

/// One cart line as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: i32,
}

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub store_id: String,
    pub user_id: String,
    pub address_id: String,
    pub phone_number: String,
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub requested_delivery_time: Option<i64>,
    pub delivery_fee: f64,
}

#[derive(Clone)]
pub struct OrderIntakeService {
    orders: OrderRepository,
    stores: StoreRepository,
    addresses: AddressRepository,
    products: ProductRepository,
    users: UserRepository,
    sequences: SequenceNumberGenerator,
    feed: OrderFeed,
}

impl OrderIntakeService {
    pub fn new(db: Surreal<Db>, feed: OrderFeed) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            stores: StoreRepository::new(db.clone()),
            addresses: AddressRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            sequences: SequenceNumberGenerator::new(db),
            feed,
        }
    }

    /// Validate, resolve, price and persist a new order.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> OrderResult<Order> {
        Self::validate(&request)?;

        self.stores
            .find_by_key(&request.store_id)
            .await?
            .ok_or_else(|| OrderError::StoreNotFound(request.store_id.clone()))?;
        self.addresses
            .find_by_key(&request.address_id)
            .await?
            .ok_or_else(|| OrderError::AddressNotFound(request.address_id.clone()))?;
        let user = self
            .users
            .find_by_key(&request.user_id)
            .await?
            .ok_or_else(|| OrderError::UserNotFound(request.user_id.clone()))?;

        // Resolve every line against the catalog, capturing the unit price
        // and category label as they are right now. Later catalog edits must
        // never retroactively change a placed order.
        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = self
                .products
                .find_by_key(&line.product_id)
                .await?
                .ok_or_else(|| OrderError::ProductNotFound(line.product_id.clone()))?;
            money::validate_unit_price(product.unit_price, &line.product_id)?;
            items.push(OrderItem {
                product_id: line.product_id.clone(),
                name: product.name,
                quantity: line.quantity,
                unit_price: product.unit_price,
                category_label: product.category_label,
            });
        }

        let lines: Vec<(f64, i32)> = items
            .iter()
            .map(|item| (item.unit_price, item.quantity))
            .collect();
        let items_price = money::items_price(&lines);
        let order_total = money::order_total(items_price, request.delivery_fee);

        // Assign identifiers and insert. The unique indexes are the final
        // arbiter; on collision both numbers are regenerated and the insert
        // retried.
        let mut last_error = None;
        for attempt in 0..MAX_CREATE_ATTEMPTS {
            let now = chrono::Utc::now();
            let order_number = self.sequences.next_order_number(now).await?;
            let tracking_number = self.sequences.next_tracking_number();
            let key = self.sequences.next_order_key();
            let created_at = now.timestamp_millis();

            let order = Order {
                id: None,
                order_number,
                tracking_number,
                store_id: request.store_id.clone(),
                user_id: request.user_id.clone(),
                address_id: request.address_id.clone(),
                username: user.display_name.clone(),
                phone_number: request.phone_number.clone(),
                items: items.clone(),
                items_price: money::to_f64(items_price),
                delivery_fee: money::to_f64(money::to_decimal(request.delivery_fee)),
                order_total: money::to_f64(order_total),
                status: OrderStatus::Pending,
                delivery_code: None,
                rating: None,
                rating_comment: None,
                payment_method: request.payment_method,
                notes: request.notes.clone(),
                requested_delivery_time: request.requested_delivery_time,
                created_at,
                updated_at: created_at,
            };

            match self.orders.create(&key, order).await {
                Ok(created) => {
                    self.feed.publish(OrderFeedEvent::created(
                        created.key().unwrap_or_default(),
                        created.store_id.clone(),
                        created.order_number.clone(),
                    ));
                    tracing::info!(
                        order_number = %created.order_number,
                        store_id = %created.store_id,
                        total = created.order_total,
                        "order placed"
                    );
                    return Ok(created);
                }
                Err(RepoError::Duplicate(msg)) => {
                    tracing::warn!(attempt, error = %msg, "order identifier collision, regenerating");
                    last_error = Some(msg);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(OrderError::Conflict(format!(
            "could not allocate a unique order number: {}",
            last_error.unwrap_or_default()
        )))
    }

    fn validate(request: &PlaceOrderRequest) -> OrderResult<()> {
        validate_required_text(&request.store_id, "store_id", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&request.user_id, "user_id", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&request.address_id, "address_id", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&request.phone_number, "phone_number", MAX_SHORT_TEXT_LEN)?;
        validate_optional_len(&request.notes, "notes", MAX_NOTE_LEN)?;

        if request.items.is_empty() {
            return Err(OrderError::Validation(
                "missing required field: items".into(),
            ));
        }
        for line in &request.items {
            validate_required_text(&line.product_id, "items.product_id", MAX_SHORT_TEXT_LEN)?;
            if line.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "quantity for product {} must be at least 1, got {}",
                    line.product_id, line.quantity
                )));
            }
            if line.quantity > money::MAX_QUANTITY {
                return Err(OrderError::Validation(format!(
                    "quantity for product {} exceeds maximum allowed ({}), got {}",
                    line.product_id,
                    money::MAX_QUANTITY,
                    line.quantity
                )));
            }
        }
        money::validate_delivery_fee(request.delivery_fee)?;
        Ok(())
    }
}
