use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::feed::OrderFeed;
use crate::orders::{
    DeliveryVerificationService, OrderIntakeService, OrderStateMachine, RatingAggregator,
};
use crate::utils::AppError;

/// Server state — shared handles for every request
///
/// Cloning is cheap: the database handle and the feed are both internally
/// reference-counted. Domain services are constructed on demand from these
/// handles; they hold no state of their own.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// Realtime order feed
    pub feed: OrderFeed,
}

impl ServerState {
    /// Initialize server state: work directory, database, feed.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_service = DbService::open(&config.database_dir()).await?;

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            feed: OrderFeed::with_capacity(config.feed_capacity),
        })
    }

    /// In-memory variant for tests and ephemeral runs.
    pub async fn initialize_in_memory(config: &Config) -> Result<Self, AppError> {
        let db_service = DbService::open_in_memory().await?;
        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            feed: OrderFeed::with_capacity(config.feed_capacity),
        })
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    // ── Domain service accessors ────────────────────────────────────

    pub fn intake(&self) -> OrderIntakeService {
        OrderIntakeService::new(self.db.clone(), self.feed.clone())
    }

    pub fn state_machine(&self) -> OrderStateMachine {
        OrderStateMachine::new(
            self.db.clone(),
            self.feed.clone(),
            self.config.cancel_window_secs,
        )
    }

    pub fn delivery(&self) -> DeliveryVerificationService {
        DeliveryVerificationService::new(self.db.clone(), self.feed.clone())
    }

    pub fn rating(&self) -> RatingAggregator {
        RatingAggregator::new(self.db.clone())
    }
}
