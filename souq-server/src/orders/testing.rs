//! Test fixtures for the order domain
//!
//! Seeds a small directory (one store, one customer, two products, one
//! address) and drives orders into the lifecycle states the tests need.

use crate::db::DbService;
use crate::db::models::{Address, Order, Product, Store, StoreCategory, User};
use crate::db::repository::{AddressRepository, ProductRepository, StoreRepository, UserRepository};
use crate::feed::OrderFeed;
use crate::orders::delivery::DeliveryVerificationService;
use crate::orders::intake::{CartItemRequest, OrderIntakeService, PlaceOrderRequest};
use crate::orders::state_machine::{Actor, OrderStateMachine};
use shared::{ActorRole, OrderStatus, PaymentMethod};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

pub async fn test_db() -> Surreal<Db> {
    DbService::open_in_memory().await.unwrap().db
}

pub fn customer() -> Actor {
    Actor::new("u1", ActorRole::Customer)
}

pub fn operator() -> Actor {
    Actor::new("op1", ActorRole::StoreOperator)
}

/// Seed the directory collaborators once per database.
pub async fn seed_directory(db: &Surreal<Db>) {
    let stores = StoreRepository::new(db.clone());
    if stores.find_by_key("s1").await.unwrap().is_some() {
        return;
    }

    stores
        .create(
            "s1",
            Store {
                id: None,
                name: "Al Noor Pharmacy".into(),
                category: StoreCategory::Pharmacy,
                rating: 0.0,
                rating_count: 0,
            },
        )
        .await
        .unwrap();

    AddressRepository::new(db.clone())
        .create(
            "a1",
            Address {
                id: None,
                zone: "Karrada".into(),
                details: "Building 12, Street 4".into(),
                latitude: 33.312,
                longitude: 44.361,
            },
        )
        .await
        .unwrap();

    UserRepository::new(db.clone())
        .create(
            "u1",
            User {
                id: None,
                display_name: "Ali Hassan".into(),
                phone_number: "+9647701112233".into(),
                role: ActorRole::Customer,
            },
        )
        .await
        .unwrap();

    let products = ProductRepository::new(db.clone());
    products
        .create(
            "p1",
            Product {
                id: None,
                name: "Paracetamol 500mg".into(),
                unit_price: 10.0,
                category_label: "Pain relief".into(),
                image_url: None,
            },
        )
        .await
        .unwrap();
    products
        .create(
            "p2",
            Product {
                id: None,
                name: "Vitamin C".into(),
                unit_price: 5.0,
                category_label: "Supplements".into(),
                image_url: None,
            },
        )
        .await
        .unwrap();
}

/// The canonical cart: 2 × 10.0 + 1 × 5.0, delivery fee 3.0.
pub fn place_request() -> PlaceOrderRequest {
    PlaceOrderRequest {
        store_id: "s1".into(),
        user_id: "u1".into(),
        address_id: "a1".into(),
        phone_number: "+9647701112233".into(),
        items: vec![
            CartItemRequest {
                product_id: "p1".into(),
                quantity: 2,
            },
            CartItemRequest {
                product_id: "p2".into(),
                quantity: 1,
            },
        ],
        payment_method: PaymentMethod::Cash,
        notes: String::new(),
        requested_delivery_time: None,
        delivery_fee: 3.0,
    }
}

/// Seed (if needed) and place one pending order.
pub async fn placed_order(db: &Surreal<Db>) -> Order {
    seed_directory(db).await;
    let intake = OrderIntakeService::new(db.clone(), OrderFeed::new());
    intake.place_order(place_request()).await.unwrap()
}

/// A placed order driven to `preparing`.
pub async fn preparing_order(db: &Surreal<Db>) -> Order {
    let order = placed_order(db).await;
    let machine = OrderStateMachine::new(db.clone(), OrderFeed::new(), 60);
    let id = order.key().unwrap();
    machine
        .transition(&id, OrderStatus::Accepted, &operator())
        .await
        .unwrap();
    machine
        .transition(&id, OrderStatus::Preparing, &operator())
        .await
        .unwrap()
}

/// A placed order driven all the way through verified delivery.
pub async fn delivered_order(db: &Surreal<Db>) -> Order {
    let order = preparing_order(db).await;
    let service = DeliveryVerificationService::new(db.clone(), OrderFeed::new());
    let id = order.key().unwrap();
    let code = service.mark_ready(&id).await.unwrap().delivery_code.unwrap();
    service.verify_and_complete(&id, &code).await.unwrap()
}

/// A second (third, ...) delivered order against the already-seeded store.
pub async fn another_delivered_order(db: &Surreal<Db>) -> Order {
    delivered_order(db).await
}

/// Rewind an order's creation time by `millis` (for window boundary tests).
pub async fn age_order(db: &Surreal<Db>, id: &str, millis: i64) {
    let record = RecordId::from_table_key("order", id);
    db.query("UPDATE $record SET created_at = created_at - $millis")
        .bind(("record", record))
        .bind(("millis", millis))
        .await
        .unwrap();
}
