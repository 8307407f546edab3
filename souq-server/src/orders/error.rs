//! Domain errors for the order lifecycle

use crate::db::repository::RepoError;
use thiserror::Error;

/// Policy and lookup failures surfaced by the order domain services.
///
/// Every variant is deterministic: retrying the same call without changing
/// intent yields the same result.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Cancellation window expired for order {0}")]
    WindowExpired(String),

    #[error("Order {0} is not awaiting delivery verification")]
    NotReady(String),

    #[error("Delivery code mismatch for order {0}")]
    CodeMismatch(String),

    #[error("Order {0} is not delivered")]
    NotDelivered(String),

    #[error("Order {0} is already rated")]
    AlreadyRated(String),

    #[error("Rating must be an integer between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Identifier allocation kept colliding after bounded retries. Internal;
    /// never surfaced to callers as a user-correctable failure.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

pub type OrderResult<T> = Result<T, OrderError>;
