//! Database Module
//!
//! Embedded SurrealDB: connection setup and schema definition.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "souq";
const DATABASE: &str = "orders";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database under `dir` and apply schema definitions.
    pub async fn open(dir: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(dir)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::finish_init(db).await
    }

    /// Open an in-memory database (tests and ephemeral runs).
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::finish_init(db).await
    }

    async fn finish_init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        define_schema(&db).await?;
        tracing::info!("Database connection established (embedded SurrealDB)");
        Ok(Self { db })
    }
}

/// Schema definitions.
///
/// Uniqueness of order numbers and tracking numbers is enforced here, at the
/// storage layer; number generators regenerate-and-retry on conflict instead
/// of trusting read-then-increment.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    let result = db
        .query(
            "
            DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS uniq_order_number ON TABLE order COLUMNS order_number UNIQUE;
            DEFINE INDEX IF NOT EXISTS uniq_tracking_number ON TABLE order COLUMNS tracking_number UNIQUE;
            DEFINE INDEX IF NOT EXISTS idx_order_store ON TABLE order COLUMNS store_id;
            DEFINE INDEX IF NOT EXISTS idx_order_user ON TABLE order COLUMNS user_id;
            DEFINE TABLE IF NOT EXISTS day_counter SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS store SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS address SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
            ",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

    result
        .check()
        .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;
    Ok(())
}
