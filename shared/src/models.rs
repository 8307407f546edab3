//! Core order enums
//!
//! The lowercase serialized forms of these values are part of the external
//! contract; clients and stored records both rely on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
///
/// Transition graph (enforced server-side):
///
/// ```text
/// pending ──► accepted ──► preparing ──► ready ──► delivered
///    │
///    ├──► rejected
///    └──► canceled   (customer, inside the cancellation window)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    Delivered,
    Rejected,
    Canceled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected | Self::Canceled)
    }

    /// Active orders are the ones still moving through fulfillment.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer intends to pay. No settlement happens in this system;
/// the method is recorded on the order for the store's benefit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    Wallet,
}

/// Role of the actor requesting an order mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    StoreOperator,
    Courier,
}
