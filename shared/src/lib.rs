//! Shared types for the Souq marketplace
//!
//! Wire-level contracts used by the order server and its clients:
//! order status values, realtime feed event payloads, and time helpers.

pub mod feed;
pub mod models;
pub mod util;

// Re-exports
pub use feed::{OrderFeedEvent, OrderFeedKind};
pub use models::{ActorRole, OrderStatus, PaymentMethod};
pub use serde::{Deserialize, Serialize};
