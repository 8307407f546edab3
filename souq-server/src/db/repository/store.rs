//! Store Directory Repository
//!
//! Lookup plus the rating aggregate write-back. Everything else about
//! stores is managed outside this service.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Store;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "store";

#[derive(Clone)]
pub struct StoreRepository {
    base: BaseRepository,
}

impl StoreRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Store>> {
        let store: Option<Store> = self.base.db().select((TABLE, key)).await?;
        Ok(store)
    }

    /// Seed a store entry (provisioning and tests).
    pub async fn create(&self, key: &str, mut store: Store) -> RepoResult<Store> {
        store.id = None;
        let created: Option<Store> = self.base.db().create((TABLE, key)).content(store).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create store".into()))
    }

    /// Replace the rating aggregate in one statement.
    pub async fn update_rating(
        &self,
        key: &str,
        rating: f64,
        rating_count: i64,
    ) -> RepoResult<Option<Store>> {
        let record = RecordId::from_table_key(TABLE, key);
        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET rating = $rating, rating_count = $rating_count RETURN AFTER")
            .bind(("record", record))
            .bind(("rating", rating))
            .bind(("rating_count", rating_count))
            .await?;
        let rows: Vec<Store> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}
