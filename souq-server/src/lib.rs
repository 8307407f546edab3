//! Souq Order Server — marketplace order lifecycle and delivery verification
//!
//! # Module structure
//!
//! ```text
//! souq-server/src/
//! ├── core/          # Config, server state, HTTP bootstrap
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Embedded SurrealDB, models, repositories
//! ├── orders/        # Domain services: intake, state machine,
//! │                  # delivery verification, rating, sequence numbers
//! ├── feed/          # Realtime order feed (global + per-store rooms)
//! └── utils/         # Errors, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod feed;
pub mod orders;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::feed::OrderFeed;
pub use crate::orders::{
    DeliveryVerificationService, OrderIntakeService, OrderStateMachine, RatingAggregator,
    SequenceNumberGenerator,
};
pub use crate::utils::logger::init_logger;
pub use crate::utils::{AppError, AppResult};
