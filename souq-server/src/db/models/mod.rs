//! Database Models

pub mod directory;
pub mod order;
pub mod serde_helpers;

// Re-exports
pub use directory::{Address, Product, Store, StoreCategory, User};
pub use order::{Order, OrderItem};
