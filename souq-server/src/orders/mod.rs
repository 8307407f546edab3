//! Order Domain Module
//!
//! The order lifecycle engine:
//!
//! - **intake**: validates cart input, resolves collaborators, assigns
//!   identifiers and persists the new order in `pending`
//! - **state_machine**: role- and time-gated status transitions
//! - **delivery**: proof-of-delivery code issuance and verification
//! - **rating**: post-delivery rating and store aggregate recomputation
//! - **sequence**: day-scoped order numbers and tracking tokens
//! - **money**: decimal-precise monetary arithmetic
//!
//! # Data Flow
//!
//! ```text
//! placeOrder → OrderIntakeService ──► OrderRepository (pending)
//!                      │
//!                      └──► OrderFeed (order.created)
//!
//! updateStatus → OrderStateMachine ──► conditional UPDATE
//!                      │                     │
//!                      │ (ready)             └──► OrderFeed
//!                      ▼
//!        DeliveryVerificationService ──► code minted / verified
//!                      │
//! rateOrder → RatingAggregator ──► store aggregate recompute
//! ```

pub mod delivery;
pub mod error;
pub mod intake;
pub mod money;
pub mod rating;
pub mod sequence;
pub mod state_machine;

#[cfg(test)]
pub mod testing;

// Re-exports
pub use delivery::DeliveryVerificationService;
pub use error::{OrderError, OrderResult};
pub use intake::{CartItemRequest, OrderIntakeService, PlaceOrderRequest};
pub use rating::RatingAggregator;
pub use sequence::SequenceNumberGenerator;
pub use state_machine::{Actor, OrderStateMachine};
