//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::{ActorRole, OrderStatus};

use crate::core::ServerState;
use crate::db::models::Order;
use crate::db::repository::OrderRepository;
use crate::orders::{Actor, PlaceOrderRequest};
use crate::utils::{AppError, AppResult};

/// Requesting actor, supplied by the authenticated caller context.
#[derive(Debug, Deserialize)]
pub struct ActorParams {
    pub actor_id: String,
    pub actor_role: ActorRole,
}

impl From<ActorParams> for Actor {
    fn from(params: ActorParams) -> Self {
        Actor::new(params.actor_id, params.actor_role)
    }
}

/// POST /api/orders - place a new order
pub async fn place_order(
    State(state): State<ServerState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = state.intake().place_order(payload).await?;
    Ok(Json(order))
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(flatten)]
    pub actor: ActorParams,
}

/// PUT /api/orders/{id}/status - apply a state machine transition
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let actor = payload.actor.into();
    let order = state
        .state_machine()
        .transition(&id, payload.status, &actor)
        .await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/ready - mark ready and mint the delivery code
///
/// The response is the only place the code is exposed; feed broadcasts
/// never carry it.
pub async fn mark_ready(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.delivery().mark_ready(&id).await?;
    Ok(Json(order))
}

/// Delivery verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// POST /api/orders/{id}/verify - prove delivery with the one-time code
pub async fn verify_delivery(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .delivery()
        .verify_and_complete(&id, &payload.code)
        .await?;
    Ok(Json(order))
}

/// Rating request
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /api/orders/{id}/rating - rate a delivered order
pub async fn rate_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .rating()
        .rate_order(&id, payload.rating, payload.comment)
        .await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id} - purge a rejected/canceled order
pub async fn purge(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<ActorParams>,
) -> AppResult<Json<Order>> {
    let actor = params.into();
    let order = state.state_machine().purge(&id, &actor).await?;
    Ok(Json(order))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(Json(order))
}

/// GET /api/orders/tracking/{tracking_number}
pub async fn get_by_tracking(
    State(state): State<ServerState>,
    Path(tracking_number): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_tracking(&tracking_number)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::not_found(format!("Order with tracking {tracking_number} not found"))
        })?;
    Ok(Json(order))
}

/// Query params for store listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/orders/store/{store_id} - store orders, paginated
pub async fn list_by_store(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo
        .list_by_store(&store_id, query.limit, query.offset)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}

/// GET /api/orders/store/{store_id}/pending - the store's intake queue
pub async fn list_pending_by_store(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo
        .list_pending_by_store(&store_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}

/// Query params for customer listings
#[derive(Debug, Deserialize)]
pub struct UserOrdersQuery {
    /// When true, only orders still moving through fulfillment.
    #[serde(default)]
    pub active: bool,
}

/// GET /api/orders/user/{user_id} - a customer's orders
pub async fn list_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<UserOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo
        .list_by_user(&user_id, query.active)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}
