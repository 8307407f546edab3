//! End-to-end order lifecycle tests against an in-memory database.

use souq_server::core::{Config, ServerState};
use souq_server::db::models::{Address, Product, Store, StoreCategory, User};
use souq_server::db::repository::{
    AddressRepository, OrderRepository, ProductRepository, StoreRepository, UserRepository,
};
use souq_server::orders::{Actor, CartItemRequest, OrderError, PlaceOrderRequest};
use shared::{ActorRole, OrderStatus, PaymentMethod};
use std::collections::HashSet;

async fn test_state() -> ServerState {
    let config = Config::with_overrides("/tmp/souq-test", 0);
    ServerState::initialize_in_memory(&config).await.unwrap()
}

async fn seed(state: &ServerState) {
    let db = state.get_db();
    StoreRepository::new(db.clone())
        .create(
            "s1",
            Store {
                id: None,
                name: "Dar Al Khobz Bakery".into(),
                category: StoreCategory::Restaurant,
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
                zone: "Mansour".into(),
                details: "House 7, Lane 2".into(),
                latitude: 33.303,
                longitude: 44.316,
            },
        )
        .await
        .unwrap();
    UserRepository::new(db.clone())
        .create(
            "u1",
            User {
                id: None,
                display_name: "Sara Ahmed".into(),
                phone_number: "+9647809998877".into(),
                role: ActorRole::Customer,
            },
        )
        .await
        .unwrap();
    let products = ProductRepository::new(db);
    products
        .create(
            "p1",
            Product {
                id: None,
                name: "Samoon".into(),
                unit_price: 10.0,
                category_label: "Bread".into(),
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
                name: "Kleicha".into(),
                unit_price: 5.0,
                category_label: "Pastry".into(),
                image_url: None,
            },
        )
        .await
        .unwrap();
}

fn request() -> PlaceOrderRequest {
    PlaceOrderRequest {
        store_id: "s1".into(),
        user_id: "u1".into(),
        address_id: "a1".into(),
        phone_number: "+9647809998877".into(),
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
        notes: "ring the bell twice".into(),
        requested_delivery_time: None,
        delivery_fee: 3.0,
    }
}

fn operator() -> Actor {
    Actor::new("op1", ActorRole::StoreOperator)
}

#[tokio::test]
async fn full_lifecycle_place_to_rated() {
    let state = test_state().await;
    seed(&state).await;

    // Place: 2 × 10 + 1 × 5 = 25, + 3 delivery = 28, pending.
    let order = state.intake().place_order(request()).await.unwrap();
    assert_eq!(order.items_price, 25.0);
    assert_eq!(order.order_total, 28.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.tracking_number.is_empty());
    let id = order.key().unwrap();

    // Store accepts and prepares.
    let machine = state.state_machine();
    machine
        .transition(&id, OrderStatus::Accepted, &operator())
        .await
        .unwrap();
    machine
        .transition(&id, OrderStatus::Preparing, &operator())
        .await
        .unwrap();

    // Ready mints a 4-digit code, visible to the caller.
    let ready = machine
        .transition(&id, OrderStatus::Ready, &operator())
        .await
        .unwrap();
    let code = ready.delivery_code.expect("code attached on ready");
    assert_eq!(code.len(), 4);

    // Courier proves delivery with the code; the code is cleared.
    let delivered = state.delivery().verify_and_complete(&id, &code).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivery_code.is_none());

    // Customer rates; the store aggregate updates.
    let rated = state
        .rating()
        .rate_order(&id, 5, Some("excellent".into()))
        .await
        .unwrap();
    assert_eq!(rated.rating, Some(5));

    let store = StoreRepository::new(state.get_db())
        .find_by_key("s1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.rating, 5.0);
    assert_eq!(store.rating_count, 1);
}

#[tokio::test]
async fn concurrent_creations_get_distinct_numbers() {
    let state = test_state().await;
    seed(&state).await;

    let mut handles = Vec::new();
    for _ in 0..12 {
        let intake = state.intake();
        handles.push(tokio::spawn(
            async move { intake.place_order(request()).await },
        ));
    }

    let mut order_numbers = HashSet::new();
    let mut tracking_numbers = HashSet::new();
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        assert!(
            order_numbers.insert(order.order_number.clone()),
            "order numbers must be unique under concurrent creation"
        );
        assert!(tracking_numbers.insert(order.tracking_number.clone()));
    }
    assert_eq!(order_numbers.len(), 12);
}

#[tokio::test]
async fn totals_invariant_holds_for_every_created_order() {
    let state = test_state().await;
    seed(&state).await;

    for quantity in 1..=5 {
        let mut req = request();
        req.items[0].quantity = quantity;
        let order = state.intake().place_order(req).await.unwrap();
        assert_eq!(order.order_total, order.items_price + order.delivery_fee);
    }
}

#[tokio::test]
async fn cancellation_window_boundary() {
    let state = test_state().await;
    seed(&state).await;
    let customer = Actor::new("u1", ActorRole::Customer);

    // Order aged just under the 60s window: cancel succeeds.
    let order = state.intake().place_order(request()).await.unwrap();
    let id = order.key().unwrap();
    age(&state, &id, 59_000).await;
    let canceled = state
        .state_machine()
        .transition(&id, OrderStatus::Canceled, &customer)
        .await
        .unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);

    // Order aged past the window: cancel fails with WindowExpired.
    let order = state.intake().place_order(request()).await.unwrap();
    let id = order.key().unwrap();
    age(&state, &id, 61_000).await;
    let err = state
        .state_machine()
        .transition(&id, OrderStatus::Canceled, &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::WindowExpired(_)));
}

async fn age(state: &ServerState, id: &str, millis: i64) {
    state
        .get_db()
        .query("UPDATE $record SET created_at = created_at - $millis")
        .bind(("record", surrealdb::RecordId::from_table_key("order", id)))
        .bind(("millis", millis))
        .await
        .unwrap();
}

#[tokio::test]
async fn ready_is_idempotent_and_codes_are_single_use() {
    let state = test_state().await;
    seed(&state).await;

    let order = state.intake().place_order(request()).await.unwrap();
    let id = order.key().unwrap();
    let machine = state.state_machine();
    machine
        .transition(&id, OrderStatus::Accepted, &operator())
        .await
        .unwrap();
    machine
        .transition(&id, OrderStatus::Preparing, &operator())
        .await
        .unwrap();

    let delivery = state.delivery();
    let first = delivery.mark_ready(&id).await.unwrap();
    let second = delivery.mark_ready(&id).await.unwrap();
    assert_eq!(
        first.delivery_code, second.delivery_code,
        "mark_ready must not regenerate an issued code"
    );

    let code = first.delivery_code.unwrap();
    delivery.verify_and_complete(&id, &code).await.unwrap();
    let err = delivery.verify_and_complete(&id, &code).await.unwrap_err();
    assert!(matches!(err, OrderError::NotReady(_)));
}

#[tokio::test]
async fn rejected_orders_can_be_purged_and_queried_no_more() {
    let state = test_state().await;
    seed(&state).await;

    let order = state.intake().place_order(request()).await.unwrap();
    let id = order.key().unwrap();
    let machine = state.state_machine();
    machine
        .transition(&id, OrderStatus::Rejected, &operator())
        .await
        .unwrap();
    machine.purge(&id, &operator()).await.unwrap();

    let repo = OrderRepository::new(state.get_db());
    assert!(repo.find_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn query_surfaces_cover_store_and_customer_views() {
    let state = test_state().await;
    seed(&state).await;

    // Three orders; move one to accepted and one through to delivered.
    let first = state.intake().place_order(request()).await.unwrap();
    let second = state.intake().place_order(request()).await.unwrap();
    let third = state.intake().place_order(request()).await.unwrap();

    let machine = state.state_machine();
    let delivery = state.delivery();
    let id2 = second.key().unwrap();
    machine
        .transition(&id2, OrderStatus::Accepted, &operator())
        .await
        .unwrap();

    let id3 = third.key().unwrap();
    machine
        .transition(&id3, OrderStatus::Accepted, &operator())
        .await
        .unwrap();
    machine
        .transition(&id3, OrderStatus::Preparing, &operator())
        .await
        .unwrap();
    let code = machine
        .transition(&id3, OrderStatus::Ready, &operator())
        .await
        .unwrap()
        .delivery_code
        .unwrap();
    delivery.verify_and_complete(&id3, &code).await.unwrap();

    let repo = OrderRepository::new(state.get_db());

    // Store view: all three orders.
    let store_orders = repo.list_by_store("s1", 50, 0).await.unwrap();
    assert_eq!(store_orders.len(), 3);

    // Pending queue: only the untouched order.
    let pending = repo.list_pending_by_store("s1").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].key(), first.key());

    // Customer: all vs active (delivered is excluded from active).
    let all = repo.list_by_user("u1", false).await.unwrap();
    assert_eq!(all.len(), 3);
    let active = repo.list_by_user("u1", true).await.unwrap();
    assert_eq!(active.len(), 2);

    // Tracking lookup finds the delivered order.
    let tracked = repo
        .find_by_tracking(&third.tracking_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tracked.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn store_aggregate_example_from_two_to_three_ratings() {
    let state = test_state().await;
    seed(&state).await;

    // Deliver three orders.
    let mut ids = Vec::new();
    for _ in 0..3 {
        let order = state.intake().place_order(request()).await.unwrap();
        let id = order.key().unwrap();
        let machine = state.state_machine();
        machine
            .transition(&id, OrderStatus::Accepted, &operator())
            .await
            .unwrap();
        machine
            .transition(&id, OrderStatus::Preparing, &operator())
            .await
            .unwrap();
        let code = machine
            .transition(&id, OrderStatus::Ready, &operator())
            .await
            .unwrap()
            .delivery_code
            .unwrap();
        state.delivery().verify_and_complete(&id, &code).await.unwrap();
        ids.push(id);
    }

    // Prior aggregate (3.0, count 2), then a 4 arrives: (3*2+4)/3.
    let rating = state.rating();
    rating.rate_order(&ids[0], 3, None).await.unwrap();
    rating.rate_order(&ids[1], 3, None).await.unwrap();

    let stores = StoreRepository::new(state.get_db());
    let store = stores.find_by_key("s1").await.unwrap().unwrap();
    assert_eq!(store.rating, 3.0);
    assert_eq!(store.rating_count, 2);

    rating.rate_order(&ids[2], 4, None).await.unwrap();
    let store = stores.find_by_key("s1").await.unwrap().unwrap();
    assert!((store.rating - 10.0 / 3.0).abs() < 1e-9);
    assert_eq!(store.rating_count, 3);
}

#[tokio::test]
async fn feed_announces_the_whole_lifecycle() {
    let state = test_state().await;
    seed(&state).await;
    let mut room = state.feed.subscribe_store("s1");

    let order = state.intake().place_order(request()).await.unwrap();
    let id = order.key().unwrap();
    let machine = state.state_machine();
    machine
        .transition(&id, OrderStatus::Accepted, &operator())
        .await
        .unwrap();
    machine
        .transition(&id, OrderStatus::Preparing, &operator())
        .await
        .unwrap();
    let code = machine
        .transition(&id, OrderStatus::Ready, &operator())
        .await
        .unwrap()
        .delivery_code
        .unwrap();
    state.delivery().verify_and_complete(&id, &code).await.unwrap();

    let statuses: Vec<OrderStatus> = (0..5).map(|_| room.try_recv().unwrap().status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ]
    );
}
